//! Text to identity.
//!
//! ```text
//! sum   := ('+'|'-')? term (('+'|'-') term)*
//! term  := integer? jordan
//! jordan:= juxt ('*' juxt)*                 a*b = ab + ba
//! juxt  := atom atom*                        left-normed, xyz = (xy)z
//! atom  := (letter | '(' sum ')' | '(' sum ',' sum ',' sum ')' | '[' sum ',' sum ']') ('^' integer)?
//! ```
//!
//! `[a,b] = ab - ba`, `(a,b,c) = (ab)c - a(bc)` and `a^n = (a^(n-1))a`.

use hashbrown::HashMap;

use crate::identity::{Identity, IdentityError, Word};

type Poly = Vec<(i64, Word)>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected {found:?} at byte {position}")]
    Unexpected { found: char, position: usize },
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("expected {expected} at byte {position}")]
    Expected {
        expected: &'static str,
        position: usize,
    },
    #[error("integer overflow at byte {position}")]
    Overflow { position: usize },
    #[error("exponent must be positive, at byte {position}")]
    BadExponent { position: usize },
    #[error("exponent above 255 at byte {position}")]
    ExponentTooLarge { position: usize },
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

pub fn parse_identity(src: &str) -> Result<Identity, ParseError> {
    Ok(Identity::from_words(parse_polynomial(src)?)?)
}

/// Expanded linear combination of words, like words merged in order of
/// first appearance, zero terms dropped.
pub fn parse_polynomial(src: &str) -> Result<Vec<(i64, Word)>, ParseError> {
    let mut parser = Parser { src, pos: 0 };
    let poly = parser.sum()?;
    match parser.peek() {
        None => Ok(poly),
        Some(found) => Err(ParseError::Unexpected {
            found,
            position: parser.pos,
        }),
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&mut self) -> Option<char> {
        let rest = &self.src[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        trimmed.chars().next()
    }
    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }
    fn expect(&mut self, c: char, expected: &'static str) -> Result<(), ParseError> {
        match self.peek() {
            Some(found) if found == c => {
                self.bump();
                Ok(())
            }
            Some(_) => Err(ParseError::Expected {
                expected,
                position: self.pos,
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
    fn overflow(&self) -> ParseError {
        ParseError::Overflow { position: self.pos }
    }

    fn integer(&mut self) -> Result<i64, ParseError> {
        self.peek();
        let start = self.pos;
        let len = self.src[start..]
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.src.len() - start);
        self.pos += len;
        self.src[start..self.pos]
            .parse()
            .map_err(|_| ParseError::Overflow { position: start })
    }

    fn sum(&mut self) -> Result<Poly, ParseError> {
        let mut ret = Vec::new();
        let mut sign = match self.peek() {
            Some('-') => {
                self.bump();
                -1
            }
            Some('+') => {
                self.bump();
                1
            }
            _ => 1,
        };
        loop {
            let term = self.term()?;
            ret.extend(self.scale(term, sign)?);
            sign = match self.peek() {
                Some('+') => 1,
                Some('-') => -1,
                _ => break,
            };
            self.bump();
        }
        self.normalize(ret)
    }

    fn term(&mut self) -> Result<Poly, ParseError> {
        let coefficient = match self.peek() {
            Some(c) if c.is_ascii_digit() => self.integer()?,
            _ => 1,
        };
        let poly = self.jordan()?;
        self.scale(poly, coefficient)
    }

    fn jordan(&mut self) -> Result<Poly, ParseError> {
        let mut acc = self.juxtaposition()?;
        while self.peek() == Some('*') {
            self.bump();
            let rhs = self.juxtaposition()?;
            let mut sym = self.mul(&acc, &rhs)?;
            sym.extend(self.mul(&rhs, &acc)?);
            acc = sym;
        }
        Ok(acc)
    }

    fn juxtaposition(&mut self) -> Result<Poly, ParseError> {
        let mut acc = self.atom()?;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic() || c == '(' || c == '[') {
            let rhs = self.atom()?;
            acc = self.mul(&acc, &rhs)?;
        }
        Ok(acc)
    }

    fn atom(&mut self) -> Result<Poly, ParseError> {
        let base = match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => {
                self.bump();
                vec![(1, Word::Letter(c))]
            }
            Some('(') => {
                self.bump();
                let a = self.sum()?;
                if self.peek() == Some(',') {
                    self.bump();
                    let b = self.sum()?;
                    self.expect(',', "',' in associator")?;
                    let c = self.sum()?;
                    self.expect(')', "')' closing associator")?;
                    let mut ret = self.mul(&self.mul(&a, &b)?, &c)?;
                    let rhs = self.mul(&a, &self.mul(&b, &c)?)?;
                    ret.extend(self.scale(rhs, -1)?);
                    ret
                } else {
                    self.expect(')', "')'")?;
                    a
                }
            }
            Some('[') => {
                self.bump();
                let a = self.sum()?;
                self.expect(',', "',' in commutator")?;
                let b = self.sum()?;
                self.expect(']', "']' closing commutator")?;
                let mut ret = self.mul(&a, &b)?;
                let rhs = self.mul(&b, &a)?;
                ret.extend(self.scale(rhs, -1)?);
                ret
            }
            Some(found) => {
                return Err(ParseError::Unexpected {
                    found,
                    position: self.pos,
                });
            }
            None => return Err(ParseError::UnexpectedEnd),
        };
        if self.peek() != Some('^') {
            return Ok(base);
        }
        self.bump();
        let position = self.pos;
        if !matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            return Err(ParseError::BadExponent { position });
        }
        let n = self.integer()?;
        if n == 0 {
            return Err(ParseError::BadExponent { position });
        }
        // No type entry can hold a higher multiplicity.
        if n > i64::from(u8::MAX) {
            return Err(ParseError::ExponentTooLarge { position });
        }
        let mut acc = base.clone();
        for _ in 1..n {
            acc = self.mul(&acc, &base)?;
        }
        Ok(acc)
    }

    fn scale(&self, poly: Poly, c: i64) -> Result<Poly, ParseError> {
        poly.into_iter()
            .map(|(x, w)| Ok((x.checked_mul(c).ok_or_else(|| self.overflow())?, w)))
            .collect()
    }

    fn mul(&self, a: &Poly, b: &Poly) -> Result<Poly, ParseError> {
        let mut ret = Vec::with_capacity(a.len() * b.len());
        for (x, u) in a {
            for (y, v) in b {
                let c = x.checked_mul(*y).ok_or_else(|| self.overflow())?;
                ret.push((c, Word::product(u.clone(), v.clone())));
            }
        }
        Ok(ret)
    }

    fn normalize(&self, poly: Poly) -> Result<Poly, ParseError> {
        let mut index: HashMap<Word, usize> = HashMap::new();
        let mut ret: Poly = Vec::new();
        for (c, w) in poly {
            if let Some(&i) = index.get(&w) {
                ret[i].0 = ret[i].0.checked_add(c).ok_or_else(|| self.overflow())?;
            } else {
                index.insert(w.clone(), ret.len());
                ret.push((c, w));
            }
        }
        ret.retain(|(c, _)| *c != 0);
        Ok(ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use itertools::Itertools as _;

    fn show(src: &str) -> String {
        match parse_polynomial(src) {
            Ok(poly) => poly.iter().map(|(c, w)| format!("{c} {w}")).join(", "),
            Err(err) => format!("error: {err}"),
        }
    }

    #[test]
    fn notation() {
        expect!["1 xy, -1 yx"].assert_eq(&show("[x,y]"));
        expect!["1 (xy)z, -1 x(yz)"].assert_eq(&show("(x,y,z)"));
        expect!["2 xy"].assert_eq(&show("x*y - yx + 2xy - xy"));
        expect!["1 (xx)x, -1 x(xx)"].assert_eq(&show("x^3 - x(x^2)"));
        expect!["1 (xy)z, 3 (yx)x"].assert_eq(&show("xyz + 3(yx)x"));
        expect!["-7 x, 10 y, 1 x(yx)"].assert_eq(&show("-7x+10y+(x(yx))"));
        expect![""].assert_eq(&show("[x,x]"));
    }

    #[test]
    fn jordan_identity() {
        // (x^2 * y) * x - x^2 * (y * x), with the Jordan product
        let poly = parse_polynomial("((x^2)*y)*x - (x^2)*(y*x)").unwrap();
        assert_eq!(poly.len(), 8);
        let id = parse_identity("((x^2)*y)*x - (x^2)*(y*x)").unwrap();
        assert_eq!(id.degrees().inner(), [3, 1]);
        expect!["((xx)y)x + (y(xx))x + x((xx)y) + x(y(xx)) - (xx)(yx) - (xx)(xy) - (yx)(xx) - (xy)(xx)"]
            .assert_eq(&id.to_string());
    }

    #[test]
    fn errors() {
        expect!["error: unexpected ')' at byte 2"].assert_eq(&show("xy)"));
        expect!["error: unexpected end of input"].assert_eq(&show("x - "));
        expect!["error: expected ',' in commutator at byte 3"].assert_eq(&show("[xy]"));
        expect!["error: exponent must be positive, at byte 2"].assert_eq(&show("x^0"));
        expect!["error: exponent above 255 at byte 2"].assert_eq(&show("x^20000"));
        expect!["error: exponent above 255 at byte 6"].assert_eq(&show("[x,y]^256"));
        expect!["error: integer overflow at byte 0"].assert_eq(&show("99999999999999999999x"));
        assert_eq!(
            parse_identity("xy - xx").unwrap_err(),
            ParseError::Identity(IdentityError::NotHomogeneous { term: 1 })
        );
        assert_eq!(
            parse_identity("xy - xy").unwrap_err(),
            ParseError::Identity(IdentityError::Empty)
        );
    }
}

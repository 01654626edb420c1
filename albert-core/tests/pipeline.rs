use albert_core::{
    CancelToken, FreeAlgebra, GenerateConfig, Status, Type, generate_equations, generate_for_type,
    parse_identity,
};

fn free_below(target: &str) -> FreeAlgebra {
    let target: Type = target.parse().unwrap();
    let degree = target.degree();
    FreeAlgebra::new(target, degree - 1).unwrap()
}

#[test]
fn basis_pairs_have_the_target_type() {
    let free = free_below("3,1");
    let jordan = parse_identity("((x^2)*y)*x - (x^2)*(y*x)").unwrap();
    let target = free.types.target_name();
    let outcome = generate_equations(
        &jordan,
        target,
        free.algebra(),
        &GenerateConfig::default(),
        &CancelToken::new(),
    );
    assert!(matches!(outcome.status, Status::Complete));
    for equation in &outcome.equations {
        for pair in &equation.terms {
            let product = free
                .types
                .add(free.basis.type_of(pair.left), free.basis.type_of(pair.right));
            assert_eq!(product, Some(target));
            assert!(!pair.coefficient.is_zero());
        }
    }
    assert_eq!(outcome.stats.equations, outcome.equations.len());
}

#[test]
fn lower_targets_get_lower_degree_identities_only() {
    let free = free_below("2,2");
    let identities = ["(xy)x - x(yx)", "((xy)y)x - x(y(yx))"].map(|s| parse_identity(s).unwrap());
    let config = GenerateConfig::default();
    let cancel = CancelToken::new();

    let three = free.types.name_of(&"2,1".parse().unwrap()).unwrap();
    let at_three = generate_for_type(&identities, three, free.algebra(), &config, &cancel);
    let only_first = generate_equations(&identities[0], three, free.algebra(), &config, &cancel);
    assert_eq!(at_three.equations, only_first.equations);
    assert!(!at_three.equations.is_empty());

    // Both identities contribute at the full target.
    let full = free.types.target_name();
    let at_four = generate_for_type(&identities, full, free.algebra(), &config, &cancel);
    let second = generate_equations(&identities[1], full, free.algebra(), &config, &cancel);
    assert!(matches!(at_four.status, Status::Complete));
    assert!(at_four.equations.len() > second.equations.len());
    assert!(at_four.equations.ends_with(&second.equations));
}

use albert_core::{CancelToken, FreeAlgebra, GenerateConfig, Type, generate_equations, parse_identity};
use criterion::{Criterion, criterion_main, measurement::WallTime};

criterion_main!(quick_bench);

const IDENTITIES: &[(&str, &str, &str)] = &[
    ("jordan", "((x^2)*y)*x - (x^2)*(y*x)", "3,2"),
    ("left_alternative", "(xx)y - x(xy)", "3,2"),
    ("moufang", "((xy)z)y - x(y(zy))", "2,2,1"),
];

fn quick_bench() {
    let mut criterion: Criterion<WallTime> =
        Criterion::default().sample_size(10).configure_from_args();

    for &(name, identity, target) in IDENTITIES {
        let identity = parse_identity(identity).unwrap();
        let target: Type = target.parse().unwrap();
        let degree = target.degree();
        let free = FreeAlgebra::new(target, degree - 1).unwrap();
        let target = free.types.target_name();

        for (mode, parallel) in [("sequential", false), ("parallel", true)] {
            let config = GenerateConfig {
                parallel,
                ..GenerateConfig::default()
            };
            criterion.bench_function(&format!("{name}_{mode}"), |b| {
                b.iter(|| {
                    generate_equations(&identity, target, free.algebra(), &config, &CancelToken::new())
                });
            });
        }
    }
}

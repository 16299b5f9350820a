use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fvmflow::assembly::{assemble, rhs};
use fvmflow::discretization::Discretization;
use fvmflow::functions::random_state;
use fvmflow::operators::convection;
use fvmflow::parameters::Parameters;

const SIZES: [(usize, usize, usize); 2] = [(32, 32, 1), (12, 12, 12)];

pub fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("Assembly");
    group.significance_level(0.1).sample_size(10);
    for (nx, ny, nz) in SIZES.iter() {
        let mut params = Parameters::default();
        params.set("Reynolds Number", 100.);
        let discretization = Discretization::new(params, *nx, *ny, *nz);
        let grid = discretization.grid();
        let state = random_state(grid.n(), 1.);
        let (jac, _) = discretization.nonlinear_part(&state);
        let mut atom = discretization.linear_part() + jac;
        discretization.boundaries(&mut atom);

        let name = format!("Size: {} x {} x {}", nx, ny, nz);
        group.bench_function(&format!("convection {}", name), |b| {
            b.iter(|| convection(grid, black_box(&state)))
        });
        group.bench_function(&format!("assemble {}", name), |b| {
            b.iter(|| assemble(&atom))
        });
        group.bench_function(&format!("rhs {}", name), |b| b.iter(|| rhs(black_box(&state), &atom)));
        group.bench_function(&format!("jacobian {}", name), |b| {
            b.iter(|| discretization.jacobian(black_box(&state)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_assembly);
criterion_main!(benches);

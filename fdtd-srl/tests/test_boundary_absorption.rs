//! Boundary Absorption Tests
//!
//! Near-rigid walls keep the injected pulse ringing; fully absorbing walls
//! drain it. Compares late-time response energy between the two.

use fdtd_srl::common::{
    box_model, InputType, MaterialConfig, MaterialMatrix, ModelConfig, Point3D, Point3DConfig,
    Precision, RunMode, SimulationConfig, Source, SurfaceCoefficient, TimingConfig,
    absorption_to_admittance,
};
use fdtd_srl::FdtdSolver;

const FS: f64 = 8_000.0;
const STEPS: usize = 300;

fn run_box_with_admittance(admittance: f64) -> Vec<f64> {
    let model = box_model(1.0, 1.0, 1.0);
    let mesh = model.to_mesh().unwrap();
    let materials = MaterialMatrix::uniform(mesh.triangle_count(), admittance);

    let mut solver = FdtdSolver::new();
    solver.set_spatial_fs(FS).unwrap();
    solver.set_num_steps(STEPS);
    solver.set_precision(Precision::Double);
    solver.set_geometry_mesh(mesh);
    solver.set_materials_matrix(materials);
    solver.add_source(
        Source::new(Point3D::new(0.5, 0.5, 0.5)).with_input_type(InputType::Gaussian),
    );
    solver.add_receiver(Point3D::new(0.7, 0.6, 0.5));
    solver.run_simulation().unwrap();
    solver.response_double(0).unwrap()
}

fn tail_energy(response: &[f64]) -> f64 {
    response[response.len() / 2..].iter().map(|v| v * v).sum()
}

#[test]
fn test_absorbing_walls_drain_the_tail() {
    // Near-rigid: R = 0.99; fully absorbing: alpha = 1
    let reflective = run_box_with_admittance((1.0 - 0.99) / (1.0 + 0.99));
    let absorbing = run_box_with_admittance(absorption_to_admittance(1.0));

    let e_reflective = tail_energy(&reflective);
    let e_absorbing = tail_energy(&absorbing);

    assert!(e_reflective > 0.0);
    assert!(
        e_absorbing < e_reflective * 0.5,
        "absorbing tail {} not well below reflective tail {}",
        e_absorbing,
        e_reflective
    );
}

#[test]
fn test_responses_stay_bounded() {
    // The lossy update must not blow up over a longer run
    for admittance in [0.0, 0.005, 0.3, 1.0] {
        let response = run_box_with_admittance(admittance);
        let peak = response.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
        assert!(peak.is_finite());
        assert!(peak < 100.0, "admittance {} diverged: {}", admittance, peak);
    }
}

#[test]
fn test_layered_materials_via_config() {
    // Per-layer overrides flow from the configuration into the engine
    let mut layers = std::collections::BTreeMap::new();
    layers.insert(
        "floor".to_string(),
        SurfaceCoefficient::Absorption { coefficient: 1.0 },
    );
    layers.insert(
        "ceiling".to_string(),
        SurfaceCoefficient::Absorption { coefficient: 1.0 },
    );
    layers.insert(
        "walls".to_string(),
        SurfaceCoefficient::Absorption { coefficient: 1.0 },
    );
    let config = SimulationConfig {
        model: ModelConfig::Inline {
            model: box_model(1.0, 1.0, 1.0),
        },
        materials: MaterialConfig {
            default: SurfaceCoefficient::Reflection { coefficient: 0.99 },
            layers,
        },
        sources: vec![Source::new(Point3D::new(0.5, 0.5, 0.5))],
        receivers: vec![Point3DConfig {
            x: 0.7,
            y: 0.6,
            z: 0.5,
        }],
        timing: TimingConfig {
            fs: FS,
            num_steps: STEPS,
        },
        engine: fdtd_srl::common::EngineConfig {
            precision: Precision::Double,
            ..Default::default()
        },
        captures: Vec::new(),
        run_mode: RunMode::Simulation,
        metadata: Default::default(),
    };

    let mut solver = FdtdSolver::from_config(&config).unwrap();
    solver.run_simulation().unwrap();
    let all_absorbing = solver.response_double(0).unwrap();

    // Everything absorbing behaves like the uniform fully absorbing box
    let uniform = run_box_with_admittance(absorption_to_admittance(1.0));
    assert_eq!(all_absorbing, uniform);
}

use approx::assert_relative_eq;
use datum::{AnchorError, AnchorKind, Assembly, BuildConfig};
use datum_ir::{Design, Positioning, Shape, Vec3 as IrVec3};
use datum_kernel::{AnalyticKernel, SolidId};
use datum_math::{Point3, Vec3};

fn block(x: f64, y: f64, z: f64) -> Shape {
    Shape::Box {
        size: IrVec3::new(x, y, z),
    }
}

fn build(design: &Design) -> Result<Assembly<SolidId>, AnchorError> {
    Assembly::from_design(&mut AnalyticKernel::new(), design, &BuildConfig::default())
}

#[test]
fn tower_from_json() {
    let json = r#"{
        "version": "0.1",
        "name": "tower",
        "declarations": [
            { "part": { "name": "base", "shape": { "type": "Box", "size": { "x": 10, "y": 10, "z": 20 } } } },
            { "part": {
                "name": "mast",
                "shape": { "type": "Cylinder", "radius": 1.0, "height": 30.0 },
                "at": { "relative_to": "base.face_top", "offset": [0, 0, 0] },
                "anchors": [ { "name": "tip", "at": { "target": "mast.face_top", "offset": [0, 0, 1] } } ]
            } },
            { "anchor": { "name": "beacon", "position": { "target": "mast.tip", "offset": [0, 0, 2] } } }
        ]
    }"#;
    let design = Design::from_json(json).unwrap();
    let assembly = build(&design).unwrap();

    assert_relative_eq!(
        assembly.resolve("mast").unwrap().origin(),
        Point3::new(5.0, 5.0, 20.0),
        epsilon = 1e-12
    );
    assert_relative_eq!(
        assembly.resolve("mast.tip").unwrap().origin(),
        Point3::new(5.0, 5.0, 51.0),
        epsilon = 1e-12
    );
    assert_relative_eq!(
        assembly.resolve("beacon").unwrap().origin(),
        Point3::new(5.0, 5.0, 53.0),
        epsilon = 1e-12
    );

    let mast: Vec<_> = assembly.anchors_of("mast").collect();
    assert_eq!(mast.len(), 12);
    assert_eq!(mast[11].kind(), AnchorKind::Named);
}

#[test]
fn boolean_part_gets_auto_anchors() {
    let drilled = Shape::Difference {
        left: Box::new(block(8.0, 8.0, 4.0)),
        right: Box::new(Shape::Cylinder {
            radius: 1.0,
            height: 10.0,
        }),
    };
    let design = Design::new()
        .part("plate", drilled, None)
        .part(
            "peg",
            Shape::Sphere { radius: 1.0 },
            Some(Positioning::at("plate.face_right", [0.0, 0.0, 1.0])),
        );
    let assembly = build(&design).unwrap();

    let right = assembly.resolve("plate.face_right").unwrap();
    assert_relative_eq!(right.origin(), Point3::new(8.0, 4.0, 2.0), epsilon = 1e-12);
    assert_relative_eq!(right.normal(), Vec3::x(), epsilon = 1e-12);

    // the sphere's origin is its centre, one unit out from the face
    assert_relative_eq!(
        assembly.resolve("peg.center").unwrap().origin(),
        Point3::new(9.0, 4.0, 2.0),
        epsilon = 1e-12
    );
}

#[test]
fn rotated_placement_moves_faces() {
    let design = Design::new().part("base", block(4.0, 4.0, 4.0), None).part(
        "flap",
        block(2.0, 1.0, 6.0),
        Some(Positioning::at("base.face_top", [0.0, 0.0, 0.0]).rotated([90.0, 0.0, 0.0])),
    );
    let assembly = build(&design).unwrap();

    // rotating 90 degrees about X lays the flap's +Z along world −Y
    let top = assembly.resolve("flap.face_top").unwrap();
    assert_relative_eq!(top.normal(), -Vec3::y(), epsilon = 1e-12);
    assert_relative_eq!(top.origin(), Point3::new(3.0, -4.0, 4.5), epsilon = 1e-12);
}

#[test]
fn errors_surface_through_from_design() {
    let forward = Design::new()
        .part(
            "lid",
            block(1.0, 1.0, 1.0),
            Some(Positioning::at("base.face_top", [0.0; 3])),
        )
        .part("base", block(1.0, 1.0, 1.0), None);
    assert!(matches!(
        build(&forward),
        Err(AnchorError::UndefinedReference { .. })
    ));

    let empty = Design::new().part(
        "nothing",
        Shape::Intersection {
            left: Box::new(block(1.0, 1.0, 1.0)),
            right: Box::new(Shape::Translate {
                child: Box::new(block(1.0, 1.0, 1.0)),
                offset: IrVec3::new(2.0, 0.0, 0.0),
            }),
        },
        None,
    );
    match build(&empty) {
        Err(AnchorError::Geometry { part, .. }) => assert_eq!(part, "nothing"),
        other => panic!("expected Geometry error, got {other:?}"),
    }
}

use bagelverse::scene::{DONUT_COUNT, GROUP_SPIN_RATE, GROUP_TILT, ScatterField};
use cgmath::{Euler, Quaternion, Rad};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn quaternions_close(a: Quaternion<f32>, b: Quaternion<f32>) -> bool {
    // q and -q are the same rotation.
    let direct = (a.s - b.s).abs() < 1e-5
        && (a.v.x - b.v.x).abs() < 1e-5
        && (a.v.y - b.v.y).abs() < 1e-5
        && (a.v.z - b.v.z).abs() < 1e-5;
    let negated = (a.s + b.s).abs() < 1e-5
        && (a.v.x + b.v.x).abs() < 1e-5
        && (a.v.y + b.v.y).abs() < 1e-5
        && (a.v.z + b.v.z).abs() < 1e-5;
    direct || negated
}

#[test]
fn scatter_has_a_hundred_donuts_within_the_spread() {
    let mut rng = StdRng::seed_from_u64(7);
    let field = ScatterField::new(&mut rng);

    assert_eq!(field.donuts().len(), DONUT_COUNT);
    for donut in field.donuts() {
        for coord in [donut.position.x, donut.position.y, donut.position.z] {
            assert!((-5.0..5.0).contains(&coord));
        }
        // Scaling is uniform, drawn from [0, 1).
        assert!((0.0..1.0).contains(&donut.scale.x));
        assert_eq!(donut.scale.x, donut.scale.y);
        assert_eq!(donut.scale.x, donut.scale.z);
    }
}

#[test]
fn scatter_positions_are_not_degenerate() {
    let mut rng = StdRng::seed_from_u64(7);
    let field = ScatterField::new(&mut rng);

    let first = field.donuts()[0].position;
    assert!(
        field
            .donuts()
            .iter()
            .any(|donut| (donut.position.x - first.x).abs() > 1e-3)
    );
}

#[test]
fn same_seed_reproduces_the_same_field() {
    let mut a = StdRng::seed_from_u64(42);
    let mut b = StdRng::seed_from_u64(42);
    let field_a = ScatterField::new(&mut a);
    let field_b = ScatterField::new(&mut b);
    assert_eq!(field_a.donuts(), field_b.donuts());
}

#[test]
fn update_sets_absolute_rotations_from_elapsed_time() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut field = ScatterField::new(&mut rng);

    field.update(10.0);

    let expected_group = Quaternion::from(Euler::new(
        Rad(GROUP_TILT),
        Rad(10.0 * GROUP_SPIN_RATE),
        Rad(0.0),
    ));
    assert!(quaternions_close(field.group().rotation, expected_group));

    let expected_donut = Quaternion::from(Euler::new(Rad(10.0), Rad(10.0), Rad(10.0)));
    for donut in field.donuts() {
        assert!(quaternions_close(donut.rotation, expected_donut));
    }

    // Rewinding to an earlier time works: rotations never accumulate.
    field.update(1.0);
    let rewound = Quaternion::from(Euler::new(Rad(1.0), Rad(1.0), Rad(1.0)));
    assert!(quaternions_close(field.donuts()[0].rotation, rewound));
}

#[test]
fn update_keeps_positions_and_scales_fixed() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut field = ScatterField::new(&mut rng);
    let positions: Vec<_> = field.donuts().iter().map(|d| d.position).collect();
    let scales: Vec<_> = field.donuts().iter().map(|d| d.scale).collect();

    field.update(123.4);

    for (donut, (position, scale)) in field.donuts().iter().zip(positions.iter().zip(&scales)) {
        assert_eq!(donut.position, *position);
        assert_eq!(donut.scale, *scale);
    }
}

#[test]
fn instance_raws_cover_every_donut() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut field = ScatterField::new(&mut rng);
    field.update(0.5);
    assert_eq!(field.instance_raws().len(), DONUT_COUNT);
}

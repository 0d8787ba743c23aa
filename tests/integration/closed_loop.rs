//! Full capture/detect/command loops against the simulated scene.

use drishti::perception::annotate;
use drishti::{
    ColorDetector, ControlConfig, Detector, DetectorConfig, DrishtiError, FrameSource,
    InferenceBackend, LoopOutcome, ModelDetector, Navigator, NavigatorConfig, NavigatorState,
    PidGains, ScoredBox, ServoLoop, SimulatedScene, SimulationConfig,
};
use image::RgbImage;

const WIDTH: u32 = 160;
const HEIGHT: u32 = 120;

/// Small frames and a low threshold keep the run short; arrival lands
/// around 0.8 m from a 0.2 m target.
fn small_navigator() -> NavigatorConfig {
    NavigatorConfig {
        arrive_area_threshold: 1600.0,
        image_width: WIDTH,
        image_height: HEIGHT,
        forward_gains: PidGains::new(2e-4, 0.0, 0.0),
        ..Default::default()
    }
}

fn small_detector() -> DetectorConfig {
    DetectorConfig {
        min_area: 50,
        open_iterations: 1,
        ..Default::default()
    }
}

fn control(max_cycles: u64) -> ControlConfig {
    ControlConfig {
        max_cycles: Some(max_cycles),
        ..Default::default()
    }
}

fn scene(sim: &SimulationConfig) -> SimulatedScene {
    SimulatedScene::new(sim, WIDTH, HEIGHT, ControlConfig::default().period_secs()).unwrap()
}

/// Stand-in model: one box around the pixels of a known colour.
struct PaintedBox {
    label: &'static str,
    rgb: [u8; 3],
}

impl InferenceBackend for PaintedBox {
    type Error = String;

    fn infer(&mut self, frame: &RgbImage) -> Result<Vec<ScoredBox>, String> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, p) in frame.enumerate_pixels() {
            if p.0 != self.rgb {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        Ok(bounds
            .map(|(x0, y0, x1, y1)| {
                vec![ScoredBox::new(
                    self.label,
                    0.9,
                    [x0 as f32, y0 as f32, (x1 + 1) as f32, (y1 + 1) as f32],
                )]
            })
            .unwrap_or_default())
    }
}

struct Offline;

impl InferenceBackend for Offline {
    type Error = &'static str;

    fn infer(&mut self, _frame: &RgbImage) -> Result<Vec<ScoredBox>, &'static str> {
        Err("model not loaded")
    }
}

#[test]
fn test_closed_loop_color_reaches_target() {
    let sim = SimulationConfig::default();
    let scene = scene(&sim);
    let start_distance = scene.distance_to_target();

    let detector = ColorDetector::from_config(&small_detector()).unwrap();
    let navigator = Navigator::with_clock(small_navigator(), scene.clock()).unwrap();
    let mut servo = ServoLoop::new(detector, navigator, scene.base(), control(3000));

    let report = servo.run(&mut scene.camera()).unwrap();

    assert_eq!(report.outcome, LoopOutcome::Arrived);
    assert_eq!(report.final_state, NavigatorState::Arrived);
    assert_eq!(scene.frames(), report.cycles);

    let distance = scene.distance_to_target();
    assert!(distance < start_distance - 0.5, "ended {:.2}m away", distance);
    assert!(distance > 0.5, "overshot to {:.2}m", distance);

    // Target ends up near the image centre.
    let pose = scene.pose();
    let bearing = (sim.target_y - pose.y).atan2(sim.target_x - pose.x) - pose.theta;
    assert!(bearing.abs() < 0.15, "bearing {:.3} rad", bearing);
}

#[test]
fn test_closed_loop_searches_for_target_behind() {
    let sim = SimulationConfig {
        start_theta: std::f32::consts::PI,
        ..Default::default()
    };
    let scene = scene(&sim);

    let detector = ColorDetector::from_config(&small_detector()).unwrap();
    let navigator = Navigator::with_clock(small_navigator(), scene.clock()).unwrap();
    let mut servo = ServoLoop::new(detector, navigator, scene.base(), control(5000));

    let report = servo.run(&mut scene.camera()).unwrap();

    assert_eq!(report.outcome, LoopOutcome::Arrived);
    // At 0.3 rad/s half a turn takes ~10 s of spinning before the approach.
    assert!(report.cycles > 100);
}

#[test]
fn test_cycle_limit_leaves_base_stopped() {
    let scene = scene(&SimulationConfig::default());
    let detector = ColorDetector::from_config(&small_detector()).unwrap();
    let navigator = Navigator::with_clock(small_navigator(), scene.clock()).unwrap();
    let mut servo = ServoLoop::new(detector, navigator, scene.base(), control(5));

    let report = servo.run(&mut scene.camera()).unwrap();
    assert_eq!(report.outcome, LoopOutcome::CycleLimit);
    assert!(report.last_command.unwrap().forward > 0.0);

    let pose = scene.pose();
    scene.camera().next_frame().unwrap();
    assert_eq!(scene.pose(), pose);
}

#[test]
fn test_model_detector_drives_same_loop() {
    let sim = SimulationConfig::default();
    let scene = scene(&sim);

    let backend = PaintedBox {
        label: "Cube",
        rgb: sim.target_rgb,
    };
    let detector: Box<dyn Detector> =
        Box::new(ModelDetector::from_config(backend, &DetectorConfig::default()));
    // Raw boxes carry no dilation margin.
    let navigator = Navigator::with_clock(
        NavigatorConfig {
            arrive_area_threshold: 900.0,
            ..small_navigator()
        },
        scene.clock(),
    )
    .unwrap();
    let mut servo = ServoLoop::new(detector, navigator, scene.base(), control(3000));

    let report = servo.run(&mut scene.camera()).unwrap();
    assert_eq!(report.outcome, LoopOutcome::Arrived);
}

#[test]
fn test_backend_failure_stops_loop() {
    let scene = scene(&SimulationConfig::default());
    let detector = ModelDetector::new(Offline, "cube", 0.4);
    let navigator = Navigator::with_clock(small_navigator(), scene.clock()).unwrap();
    let mut servo = ServoLoop::new(detector, navigator, scene.base(), control(10));

    let err = servo.run(&mut scene.camera()).unwrap_err();
    assert!(matches!(err, DrishtiError::Detector(msg) if msg.contains("model not loaded")));
}

#[test]
fn test_annotated_frame_marks_detection() {
    let scene = scene(&SimulationConfig::default());
    let frame = scene.camera().next_frame().unwrap().unwrap();
    let mut detector = ColorDetector::from_config(&small_detector()).unwrap();

    let det = detector.detect(&frame).unwrap();
    assert!(det.found);

    let annotated = annotate(&frame, &det);
    assert_eq!(annotated.dimensions(), frame.dimensions());
    let (cx, cy) = det.centroid().unwrap();
    assert_eq!(annotated.get_pixel(cx as u32, cy as u32).0, [0, 0, 255]);
}

use flip_motion::platform::headless::HeadlessPlatform;
use flip_motion::prelude::*;

fn setup(visible: f64, extent: f64) -> (HeadlessPlatform, Animator<HeadlessPlatform>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let platform = HeadlessPlatform::new();
    platform.set_viewport(visible, extent);
    let animator = Animator::new(platform.clone());
    (platform, animator)
}

fn viewport_offset(platform: &HeadlessPlatform) -> f64 {
    platform.scroll_offset(&ScrollContainer::Viewport).unwrap()
}

/// Step one frame at a time, collecting the offset after each
fn record(platform: &HeadlessPlatform, animator: &Animator<HeadlessPlatform>) -> Vec<(f64, f64)> {
    let mut samples = Vec::new();
    while animator.is_scrolling() && samples.len() < 1000 {
        platform.advance(16.0);
        samples.push((platform.now(), viewport_offset(platform)));
    }
    samples
}

#[test]
fn test_scroll_converges_monotonically() {
    let (platform, animator) = setup(500.0, 3000.0);

    animator.scroll_to(400.0, 400.0).unwrap();
    assert!(animator.is_scrolling());

    let samples = record(&platform, &animator);
    let offsets: Vec<f64> = samples.iter().map(|(_, offset)| *offset).collect();
    assert!(offsets.windows(2).all(|pair| pair[1] >= pair[0]));
    assert_eq!(*offsets.last().unwrap(), 400.0);

    let (finished_at, _) = *samples.last().unwrap();
    assert!(finished_at <= 400.0 + 16.0, "finished at {}", finished_at);
    assert!(!animator.is_scrolling());
    assert_eq!(platform.pending_frames(), 0);
}

#[test]
fn test_scroll_is_linear_in_time() {
    let (platform, animator) = setup(500.0, 3000.0);

    animator.scroll_to(1600.0, 1600.0).unwrap();
    platform.advance(800.0);
    assert_eq!(viewport_offset(&platform), 800.0);
}

#[test]
fn test_scroll_upwards() {
    let (platform, animator) = setup(500.0, 3000.0);
    platform
        .set_scroll_offset(&ScrollContainer::Viewport, 1000.0)
        .unwrap();

    animator.scroll_to(200.0, 320.0).unwrap();
    let offsets: Vec<f64> = record(&platform, &animator)
        .into_iter()
        .map(|(_, offset)| offset)
        .collect();
    assert!(offsets.windows(2).all(|pair| pair[1] <= pair[0]));
    assert_eq!(*offsets.last().unwrap(), 200.0);
}

#[test]
fn test_zero_distance_schedules_nothing() {
    let (platform, animator) = setup(500.0, 3000.0);
    platform
        .set_scroll_offset(&ScrollContainer::Viewport, 250.0)
        .unwrap();

    animator.scroll_to(250.0, 400.0).unwrap();
    assert!(!animator.is_scrolling());
    assert_eq!(platform.pending_tasks(), 0);
}

#[test]
fn test_clamped_extent_stops_early() {
    let (platform, animator) = setup(500.0, 1000.0);

    animator.scroll_to(5000.0, 1000.0).unwrap();
    let samples = record(&platform, &animator);

    let (finished_at, last) = *samples.last().unwrap();
    assert_eq!(last, 500.0);
    assert!(finished_at < 200.0, "finished at {}", finished_at);
    assert!(!animator.is_scrolling());
}

#[test]
fn test_timer_fallback_without_animation_frames() {
    let (platform, animator) = setup(500.0, 3000.0);
    platform.set_animation_frames(false);

    animator.scroll_to(300.0, 300.0).unwrap();
    platform.advance(320.0);

    assert_eq!(viewport_offset(&platform), 300.0);
    assert!(!animator.is_scrolling());
    assert_eq!(platform.frames_run(), 0);
}

#[test]
fn test_new_scroll_supersedes_running_one() {
    let (platform, animator) = setup(500.0, 5000.0);

    animator.scroll_to(1000.0, 1000.0).unwrap();
    platform.advance(96.0);
    let midway = viewport_offset(&platform);
    assert!((midway - 96.0).abs() < 1e-9, "{}", midway);

    animator.scroll_to(0.0, 160.0).unwrap();
    // The running loop's frame carries on; no second loop is started
    assert_eq!(platform.pending_frames(), 1);
    let session = animator.scroll_session().unwrap();
    assert_eq!(session.start_offset, midway);
    assert_eq!(session.end_offset, 0.0);

    platform.advance(200.0);
    assert_eq!(viewport_offset(&platform), 0.0);
    assert!(!animator.is_scrolling());
}

#[test]
fn test_cancel_stops_the_loop() {
    let (platform, animator) = setup(500.0, 5000.0);

    animator.scroll_to(1000.0, 1000.0).unwrap();
    platform.advance(160.0);
    animator.cancel_scroll();
    let stopped_at = viewport_offset(&platform);

    platform.advance(500.0);
    assert_eq!(viewport_offset(&platform), stopped_at);
    assert_eq!(platform.pending_tasks(), 0);
}

#[test]
fn test_scroll_to_element_top_and_bottom() {
    let (platform, animator) = setup(500.0, 5000.0);
    let section = platform.create_element(Rect::new(0.0, 1200.0, 300.0, 200.0));

    animator
        .scroll(ScrollTarget::Element(section), ScrollOptions::new().duration(100.0))
        .unwrap();
    platform.run_until_idle();
    assert_eq!(viewport_offset(&platform), 1200.0);

    platform
        .set_scroll_offset(&ScrollContainer::Viewport, 0.0)
        .unwrap();
    animator
        .scroll(
            ScrollTarget::Element(section),
            ScrollOptions::new().duration(100.0).align(Align::Bottom),
        )
        .unwrap();
    platform.run_until_idle();
    // bottom edge 1400 lined up with the bottom of a 500px viewport
    assert_eq!(viewport_offset(&platform), 900.0);
}

#[test]
fn test_scroll_inside_element_container() {
    let (platform, animator) = setup(800.0, 800.0);
    let list = platform.create_element(Rect::new(0.0, 100.0, 300.0, 400.0));
    platform.set_scroll_metrics(list, 400.0, 2000.0);
    let item = platform.create_element(Rect::new(0.0, 900.0, 300.0, 50.0));
    platform.set_scroll_parent(item, list);

    let container = ScrollContainer::Element(list);
    animator
        .scroll(
            ScrollTarget::Element(item),
            ScrollOptions::new().element(list).per100(10.0),
        )
        .unwrap();
    assert_eq!(animator.scroll_session().unwrap().duration_ms, 80.0);

    platform.run_until_idle();
    assert_eq!(platform.scroll_offset(&container).unwrap(), 800.0);
    assert_eq!(viewport_offset(&platform), 0.0);
}

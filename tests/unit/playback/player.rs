use super::*;

fn info(frames: f32) -> AnimationInfo {
    AnimationInfo::from_timeline(frames, 10.0, 16.0, 16.0)
}

fn drain(p: &mut Player, limit: usize) -> Vec<Tick> {
    std::iter::from_fn(|| p.tick()).take(limit).collect()
}

fn frames(ticks: &[Tick]) -> Vec<u32> {
    ticks.iter().map(|t| t.frame).collect()
}

#[test]
fn single_pass_plays_every_frame_then_ends() {
    let mut p = Player::new(info(4.0), PlaybackOpts::default()).unwrap();
    let ticks = drain(&mut p, 100);
    assert_eq!(frames(&ticks), vec![0, 1, 2, 3]);
    assert_eq!(ticks[0].events.as_slice(), &[PlaybackEvent::Start]);
    assert_eq!(ticks[3].events.as_slice(), &[PlaybackEvent::End]);
    assert!(p.is_ended());
    assert!(!p.is_running());
    assert!(p.tick().is_none());
}

#[test]
fn restart_mode_repeats_the_range() {
    let opts = PlaybackOpts {
        repeat_count: RepeatCount::Finite(2),
        ..PlaybackOpts::default()
    };
    let mut p = Player::new(info(3.0), opts).unwrap();
    let ticks = drain(&mut p, 100);
    assert_eq!(frames(&ticks), vec![0, 1, 2, 0, 1, 2, 0, 1, 2]);
    let repeats = ticks
        .iter()
        .filter(|t| t.events.contains(&PlaybackEvent::Repeat))
        .count();
    assert_eq!(repeats, 2);
    assert_eq!(p.repeated(), 2);
}

#[test]
fn reverse_mode_ping_pongs() {
    let opts = PlaybackOpts {
        repeat_mode: RepeatMode::Reverse,
        repeat_count: RepeatCount::Finite(2),
        ..PlaybackOpts::default()
    };
    let mut p = Player::new(info(3.0), opts).unwrap();
    let ticks = drain(&mut p, 100);
    assert_eq!(frames(&ticks), vec![0, 1, 2, 1, 0, 1, 2]);
    assert_eq!(ticks.last().unwrap().events.as_slice(), &[PlaybackEvent::End]);
}

#[test]
fn infinite_repeat_never_ends() {
    let opts = PlaybackOpts {
        repeat_count: RepeatCount::Infinite,
        ..PlaybackOpts::default()
    };
    let mut p = Player::new(info(2.0), opts).unwrap();
    assert_eq!(drain(&mut p, 50).len(), 50);
    assert!(p.is_running());
    assert!(!p.is_ended());
}

#[test]
fn frame_range_is_clamped_to_the_timeline() {
    let opts = PlaybackOpts {
        first_frame: 2,
        last_frame: Some(100),
        ..PlaybackOpts::default()
    };
    let p = Player::new(info(5.0), opts).unwrap();
    assert_eq!(p.frame_range(), (2, 4));

    let opts = PlaybackOpts {
        first_frame: 9,
        last_frame: Some(3),
        ..PlaybackOpts::default()
    };
    let p = Player::new(info(5.0), opts).unwrap();
    assert_eq!(p.frame_range(), (3, 3));
}

#[test]
fn single_frame_range_in_reverse_mode_ends() {
    let opts = PlaybackOpts {
        first_frame: 1,
        last_frame: Some(1),
        repeat_mode: RepeatMode::Reverse,
        repeat_count: RepeatCount::Finite(1),
        ..PlaybackOpts::default()
    };
    let mut p = Player::new(info(3.0), opts).unwrap();
    assert_eq!(frames(&drain(&mut p, 10)), vec![1, 1]);
}

#[test]
fn pause_and_resume_keep_position() {
    let opts = PlaybackOpts {
        autoplay: false,
        ..PlaybackOpts::default()
    };
    let mut p = Player::new(info(5.0), opts).unwrap();
    assert!(p.tick().is_none());

    p.start();
    p.tick();
    p.tick();
    p.pause();
    assert!(p.tick().is_none());
    assert_eq!(p.frame(), 2);

    p.resume();
    let t = p.tick().unwrap();
    assert_eq!(t.frame, 2);
    assert!(t.events.is_empty());
}

#[test]
fn start_rewinds_after_end() {
    let mut p = Player::new(info(2.0), PlaybackOpts::default()).unwrap();
    drain(&mut p, 10);
    p.resume();
    assert!(!p.is_running());

    p.start();
    let t = p.tick().unwrap();
    assert_eq!(t.frame, 0);
    assert_eq!(t.events.as_slice(), &[PlaybackEvent::Start]);
}

#[test]
fn frame_interval_scales_with_speed() {
    // 10 frames at 10 fps: 100ms per frame.
    let mut p = Player::new(info(10.0), PlaybackOpts::default()).unwrap();
    assert_eq!(p.frame_interval(), Duration::from_millis(100));
    p.set_speed(2.0).unwrap();
    assert_eq!(p.frame_interval(), Duration::from_millis(50));
}

#[test]
fn invalid_speed_is_rejected() {
    let opts = PlaybackOpts {
        speed: 0.0,
        ..PlaybackOpts::default()
    };
    assert!(Player::new(info(3.0), opts).is_err());

    let mut p = Player::new(info(3.0), PlaybackOpts::default()).unwrap();
    assert!(p.set_speed(f32::NAN).is_err());
    assert_eq!(p.speed(), 1.0);
}

#[test]
fn empty_timeline_is_rejected() {
    let err = Player::new(info(0.0), PlaybackOpts::default()).unwrap_err();
    assert!(err.to_string().starts_with("validation error:"));
}

#[test]
fn set_repeat_count_resets_pass_counter() {
    let opts = PlaybackOpts {
        repeat_count: RepeatCount::Infinite,
        ..PlaybackOpts::default()
    };
    let mut p = Player::new(info(2.0), opts).unwrap();
    drain(&mut p, 5);
    assert!(p.repeated() > 0);
    p.set_repeat_count(RepeatCount::Finite(0));
    assert_eq!(p.repeated(), 0);
}

#[test]
fn frame_interval_saturates_for_tiny_speeds() {
    let mut p = Player::new(info(30.0), PlaybackOpts::default()).unwrap();
    p.set_speed(1e-30).unwrap();
    assert_eq!(p.frame_interval(), Duration::MAX);
}

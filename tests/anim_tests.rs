use desklet_engine::{DeskletConfig, DeskletManager, Icon};

fn manager_with_one_desklet() -> (DeskletManager, desklet_engine::DeskletId) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut manager = DeskletManager::new(DeskletConfig::default());
    let id = manager.create(Icon::new("main", 32.0, 32.0), None);
    let d = manager.desklet_mut(id).unwrap();
    d.width = 100.0;
    d.height = 100.0;
    (manager, id)
}

#[test]
fn buttons_fade_in_over_ten_frames() {
    let (mut manager, id) = manager_with_one_desklet();
    manager.pointer_enter(id);
    assert!(manager.is_animating(id));

    let mut frames = 0;
    while manager.tick(id) {
        frames += 1;
        assert!(frames < 100, "fade never settled");
    }
    frames += 1;

    let d = manager.desklet(id).unwrap();
    assert_eq!(frames, 10);
    assert_eq!(d.buttons_alpha, 1.0);
    assert!(!d.buttons_apparition);
    assert!(!manager.is_animating(id));
}

#[test]
fn buttons_fade_out_after_leaving() {
    let (mut manager, id) = manager_with_one_desklet();
    manager.desklet_mut(id).unwrap().buttons_alpha = 1.0;
    manager.pointer_leave(id);

    let mut frames = 0;
    while manager.tick(id) {
        frames += 1;
        assert!(frames < 100, "fade never settled");
    }

    let d = manager.desklet(id).unwrap();
    assert_eq!(d.buttons_alpha, 0.0);
    assert!(!d.buttons_apparition);
}

#[test]
fn direction_follows_cursor_mid_fade() {
    let (mut manager, id) = manager_with_one_desklet();
    manager.pointer_enter(id);
    manager.tick(id);
    manager.tick(id);
    let alpha_in = manager.desklet(id).unwrap().buttons_alpha;
    assert!(alpha_in > 0.0 && alpha_in < 1.0);

    // The same update handler fades back out once the cursor leaves.
    manager.pointer_leave(id);
    manager.tick(id);
    assert!(manager.desklet(id).unwrap().buttons_alpha < alpha_in);
}

#[test]
fn grow_up_overshoots_then_snaps_to_rest() {
    let (mut manager, id) = manager_with_one_desklet();
    {
        let d = manager.desklet_mut(id).unwrap();
        d.ratio = 0.95;
        d.growing_up = true;
    }

    let mut frames = 0;
    while manager.tick(id) {
        frames += 1;
        assert!(frames < 20, "grow never settled");
    }

    let d = manager.desklet(id).unwrap();
    assert_eq!(d.ratio, 1.0);
    assert!(!d.growing_up);
}

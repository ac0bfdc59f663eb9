use std::time::Duration;

use summit_game::{
    BundledData, Catalog, MissionError, MissionOutcome, MissionReport, MissionSession,
    PurchaseOutcome, SummitEngine,
};

fn bundled_session() -> (Catalog, MissionSession) {
    let engine = SummitEngine::new(BundledData);
    (engine.catalog().unwrap(), engine.create_session().unwrap())
}

fn climb(session: &mut MissionSession) -> MissionReport {
    session
        .advance(Duration::from_secs(3_600))
        .report
        .expect("mission should settle within an hour")
}

#[test]
fn bundled_campaign_unlocks_every_level() {
    let (catalog, mut session) = bundled_session();
    assert_eq!(catalog.levels.len(), 4);

    for level in &catalog.levels {
        for item_id in level.required_items() {
            let item = catalog.find_item(item_id).unwrap().clone();
            assert_eq!(session.purchase_item(&item), PurchaseOutcome::Purchased);
        }
        assert!(session.is_level_available(level), "{} locked", level.name);
        session.try_start_mission(level).unwrap();
        let report = climb(&mut session);
        assert_eq!(report.outcome, MissionOutcome::Summited, "{}", level.name);
        assert_eq!(report.max_level, level.required_level + 1);
    }

    let stats = session.player_stats();
    assert_eq!(stats.max_level, 4);
    assert!((stats.money - 105.0).abs() < 1e-9);
    assert!((stats.max_stamina - 1055.0).abs() < 1e-9);
    assert!(stats.owns_item("gps_0"));
}

#[test]
fn later_levels_stay_locked_until_earned() {
    let (catalog, mut session) = bundled_session();
    let little_si = catalog.level("little si").unwrap().clone();
    assert!(!session.is_level_available(&little_si));
    assert!(matches!(
        session.try_start_mission(&little_si),
        Err(MissionError::LevelLocked {
            required: 1,
            unlocked: 0,
            ..
        })
    ));

    let ridge = catalog.level("Rattlesnake Ridge").unwrap().clone();
    session.try_start_mission(&ridge).unwrap();
    climb(&mut session);
    assert!(session.is_level_available(&little_si));
}

#[test]
fn mt_si_requires_a_map() {
    let (catalog, session) = bundled_session();
    let mut player = session.into_player_stats();
    player.max_level = 3;
    player.money = 5.0;
    let mut session =
        MissionSession::new(summit_game::MissionConfig::default(), player).unwrap();

    let mt_si = catalog.level("Mt. Si").unwrap().clone();
    assert_eq!(
        session.try_start_mission(&mt_si),
        Err(MissionError::MissingItems {
            level: "Mt. Si".to_string(),
            items: vec!["gps_0".to_string()],
        })
    );

    let map = catalog.find_item("gps_0").unwrap().clone();
    assert_eq!(session.purchase_item(&map), PurchaseOutcome::Purchased);
    assert!((session.player_stats().money - 0.0).abs() < f64::EPSILON);
    // Equipped items satisfy requirements as well.
    assert!(session.equip_item("gps_0"));
    assert!(session.try_start_mission(&mt_si).is_ok());
}

#[test]
fn failed_attempts_still_grow_stamina() {
    let (catalog, session) = bundled_session();
    let mut player = session.into_player_stats();
    player.max_stamina = 20.0;
    let mut session =
        MissionSession::new(summit_game::MissionConfig::default(), player).unwrap();
    let ridge = catalog.level("Rattlesnake Ridge").unwrap().clone();

    let mut attempts = 0;
    let report = loop {
        attempts += 1;
        session.start_mission(&ridge);
        let report = climb(&mut session);
        if report.completed() || attempts == 5 {
            break report;
        }
        assert_eq!(report.outcome, MissionOutcome::Exhausted);
        assert!((report.stamina_granted - 2.0).abs() < f64::EPSILON);
    };

    // 100 ticks at 0.204 stamina each needs at least 20.4 stamina.
    assert_eq!(attempts, 2);
    assert!(report.completed());
    assert!((session.player_stats().max_stamina - 27.0).abs() < 1e-9);
    assert!((session.player_stats().money - 10.0).abs() < 1e-9);
}

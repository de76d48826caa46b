//! End-to-end character building through the engine: use cases, ledger
//! cache and the JSON cache file together.

use std::path::Path;
use std::sync::Arc;

use heroforge_domain::rules::available_extended_ids;
use heroforge_domain::{
    ActivatableEntry, ActiveObject, ApCost, CharacterId, CharacterSnapshot, DependencyTarget,
    EligibilityContext, ExperienceLevel, ImprovementCost, IncreasableEntry, IncreasableKind,
    RuleData, StyleFamily,
};
use heroforge_engine::infrastructure::{
    ap_cache_file::JsonApCacheFile, clock::SystemClock, config::EngineConfig,
    in_memory::InMemoryCharacterStore,
};
use heroforge_engine::use_cases::{
    ActivationError, CacheOrigin, IncreaseError, Invalidation, LoadStatus, PersistStatus,
};
use heroforge_engine::App;

fn rules() -> RuleData {
    let mut level = ExperienceLevel::average("EL_3");
    level.max_skill_rating = 14;

    RuleData::new()
        .with_attribute("ATTR_1", "Courage")
        .with_attribute("ATTR_2", "Sagacity")
        .with_attribute("ATTR_3", "Intuition")
        .with_experience_level(level)
        .with_increasable(
            IncreasableEntry::new("TAL_1", "Climbing", IncreasableKind::Skill, ImprovementCost::B)
                .with_check(["ATTR_1", "ATTR_2", "ATTR_3"]),
        )
        .with_activatable(
            ActivatableEntry::advantage("ADV_5", "Noble Blood")
                .with_cost(ApCost::Flat(50))
                .without_max_ap_influence(),
        )
        .with_activatable(style("SA_STYLE_A", ["SA_EXT_1", "SA_EXT_2", "SA_EXT_3"]))
        .with_activatable(style("SA_STYLE_B", ["SA_EXT_1", "SA_EXT_4", "SA_EXT_5"]))
        .with_activatable(extended("SA_EXT_1"))
        .with_activatable(extended("SA_EXT_2"))
}

fn style(id: &str, slots: [&str; 3]) -> ActivatableEntry {
    ActivatableEntry::special_ability(id, id)
        .with_group(9)
        .with_cost(ApCost::Flat(10))
        .with_extended(slots.into_iter().map(DependencyTarget::from).collect())
}

fn extended(id: &str) -> ActivatableEntry {
    ActivatableEntry::special_ability(id, id)
        .with_group(11)
        .with_cost(ApCost::Flat(5))
}

fn app(cache: &Path, characters: Arc<InMemoryCharacterStore>) -> App {
    let config = EngineConfig {
        cache_path: cache.to_path_buf(),
        ..EngineConfig::default()
    };
    App::new(
        &config,
        Arc::new(rules()),
        characters,
        Arc::new(JsonApCacheFile::new(cache)),
        Arc::new(SystemClock::new()),
    )
}

fn hero(total_ap: i32) -> CharacterSnapshot {
    CharacterSnapshot::new(CharacterId::new(), "Alrik", "EL_3").with_total_ap(total_ap)
}

#[test]
fn empty_character_has_an_all_zero_ledger() {
    let dir = tempfile::tempdir().expect("tempdir");
    let character = hero(0);
    let id = character.id;
    let app = app(
        &dir.path().join("cache.json"),
        Arc::new(InMemoryCharacterStore::with_characters([character])),
    );

    let ledger = app.ledger.ledger_for(id).expect("ledger");

    assert_eq!(ledger.spent, 0);
    assert_eq!(ledger.bucket_sum(), 0);
    assert_eq!(ledger.available, Some(0));
}

#[test]
fn skill_maximum_is_the_lowest_cap() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app(&dir.path().join("cache.json"), Arc::new(InMemoryCharacterStore::new()));
    let character = hero(2000)
        .with_attribute("ATTR_1", 14)
        .with_attribute("ATTR_2", 12)
        .with_attribute("ATTR_3", 10)
        .with_increasable(IncreasableKind::Skill, "TAL_1", 14);

    let skill = app.rules.increasable("TAL_1").expect("skill");
    assert_eq!(EligibilityContext::new(&app.rules, &character).max_value(skill), 14);

    let err = app
        .use_cases
        .increasable
        .increase(&character, "TAL_1")
        .expect_err("must fail");
    assert!(matches!(err, IncreaseError::AtMaximum { max: 14, .. }));
}

#[test]
fn taking_an_extended_ability_occupies_one_slot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app(&dir.path().join("cache.json"), Arc::new(InMemoryCharacterStore::new()));
    let activation = &app.use_cases.activation;

    let styled = activation
        .activate(&hero(100), "SA_STYLE_A", ActiveObject::new())
        .expect("style")
        .character;
    let extended = activation
        .activate(&styled, "SA_EXT_1", ActiveObject::new())
        .expect("extended")
        .character;

    let slots = extended.style_dependencies.family(StyleFamily::Combat);
    assert_eq!(slots.iter().filter(|slot| slot.is_taken()).count(), 1);
    assert_eq!(slots.iter().filter(|slot| !slot.is_taken()).count(), 2);
    assert!(!available_extended_ids(&extended.style_dependencies).contains("SA_EXT_1"));
}

#[test]
fn removing_a_style_moves_its_marker_to_a_sibling() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app(&dir.path().join("cache.json"), Arc::new(InMemoryCharacterStore::new()));
    let activation = &app.use_cases.activation;

    let mut character = hero(100);
    for id in ["SA_STYLE_A", "SA_STYLE_B", "SA_EXT_1"] {
        character = activation
            .activate(&character, id, ActiveObject::new())
            .expect("activate")
            .character;
    }
    let taken = character.style_dependencies.family(StyleFamily::Combat);
    assert_eq!(taken[0].origin, "SA_STYLE_A");
    assert!(taken[0].is_taken());

    let outcome = activation
        .deactivate(&character, "SA_STYLE_A", 0)
        .expect("deactivate");

    assert!(outcome.diagnostics.is_empty());
    let slots = outcome.character.style_dependencies.family(StyleFamily::Combat);
    assert_eq!(slots.len(), 3);
    assert!(slots.iter().all(|slot| slot.origin == "SA_STYLE_B"));
    let moved: Vec<_> = slots.iter().filter(|slot| slot.is_taken()).collect();
    assert_eq!(moved.len(), 1);
    assert!(moved[0].target.is_exactly("SA_EXT_1"));
}

#[test]
fn style_without_a_sibling_stays_while_its_slot_is_taken() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app(&dir.path().join("cache.json"), Arc::new(InMemoryCharacterStore::new()));
    let activation = &app.use_cases.activation;

    let styled = activation
        .activate(&hero(100), "SA_STYLE_A", ActiveObject::new())
        .expect("style")
        .character;
    let extended = activation
        .activate(&styled, "SA_EXT_2", ActiveObject::new())
        .expect("extended")
        .character;

    let err = activation
        .deactivate(&extended, "SA_STYLE_A", 0)
        .expect_err("must fail");
    assert!(matches!(err, ActivationError::RemovalUnsafe(_)));
}

#[test]
fn entries_outside_the_budget_show_but_do_not_count() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app(&dir.path().join("cache.json"), Arc::new(InMemoryCharacterStore::new()));

    let outcome = app
        .use_cases
        .activation
        .activate(&hero(10), "ADV_5", ActiveObject::new())
        .expect("activate");

    assert_eq!(outcome.ledger.spent_on_advantages.display, 50);
    assert_eq!(outcome.ledger.spent_on_advantages.budget, 0);
    assert_eq!(outcome.ledger.spent, 50);
    assert_eq!(outcome.ledger.available, Some(10));
}

#[test]
fn recomputation_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let character = hero(1100)
        .with_attribute("ATTR_1", 13)
        .with_increasable(IncreasableKind::Skill, "TAL_1", 7);
    let id = character.id;
    let app = app(
        &dir.path().join("cache.json"),
        Arc::new(InMemoryCharacterStore::with_characters([character])),
    );

    app.ledger.invalidate(Invalidation::Character(id));
    let first = app.ledger.ledger_for(id).expect("ledger");
    app.ledger.invalidate(Invalidation::Character(id));
    let second = app.ledger.ledger_for(id).expect("ledger");

    assert_eq!(first, second);
    assert_eq!(first.spent, first.bucket_sum());
}

#[test]
fn cached_ledgers_survive_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = dir.path().join("cache.json");
    let character = hero(100);
    let id = character.id;
    let characters = Arc::new(InMemoryCharacterStore::with_characters([character.clone()]));

    let first = app(&cache, characters.clone());
    let outcome = first
        .use_cases
        .activation
        .activate(&character, "SA_STYLE_A", ActiveObject::new())
        .expect("activate");
    assert_eq!(outcome.persist, PersistStatus::Saved);
    characters.commit(outcome.character);

    let second = app(&cache, characters);
    assert_eq!(second.ledger.load_persisted(), LoadStatus::Loaded(1));
    let entry = second.ledger.entry_for(id).expect("entry");
    assert_eq!(entry.origin, CacheOrigin::Persisted);
    assert_eq!(entry.ledger, outcome.ledger);

    second.ledger.invalidate(Invalidation::All);
    let recomputed = second.ledger.entry_for(id).expect("entry");
    assert_eq!(recomputed.origin, CacheOrigin::Computed);
    assert_eq!(recomputed.ledger, outcome.ledger);
}

#[test]
fn a_corrupt_cache_file_is_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = dir.path().join("cache.json");
    std::fs::write(&cache, "[1, 2").expect("write");
    let character = hero(100);
    let id = character.id;
    let app = app(&cache, Arc::new(InMemoryCharacterStore::with_characters([character])));

    assert!(matches!(app.ledger.load_persisted(), LoadStatus::Failed(_)));
    assert_eq!(app.ledger.ledger_for(id).expect("ledger").available, Some(100));
    assert_eq!(app.ledger.persist(), PersistStatus::Saved);
}

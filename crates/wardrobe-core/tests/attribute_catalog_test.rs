//! Catalog and options behaviour against the in-memory store.
//!
//! Every kind goes through the same generic catalog, so most tests loop over
//! `AttributeKind::ALL`.

use uuid::Uuid;
use wardrobe_core::memory::InMemoryWardrobe;
use wardrobe_core::{AttributeKind, AttributeRepository, Error, OptionSource, TagLinkRepository};

#[tokio::test]
async fn test_create_is_idempotent_across_case_and_whitespace() {
    for kind in AttributeKind::ALL {
        let store = InMemoryWardrobe::new();
        let catalog = store.catalog(kind);
        let user = Uuid::new_v4();

        let first = catalog.create(user, "Blue").await.expect("create Blue");
        let second = catalog.create(user, " blue ").await.expect("create ' blue '");
        let third = catalog.create(user, "BLUE").await.expect("create BLUE");

        assert_eq!(first.id, second.id, "{kind}: ' blue ' should reuse the row");
        assert_eq!(first.id, third.id, "{kind}: BLUE should reuse the row");
        assert_eq!(store.attribute_count(kind, user), 1);

        let rows = catalog.list(user, false).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_active);
        assert_eq!(rows[0].name, "Blue", "first spelling is kept on reactivate");
    }
}

#[tokio::test]
async fn test_create_reactivates_deactivated_entry() {
    let store = InMemoryWardrobe::new();
    let catalog = store.catalog(AttributeKind::Material);
    let user = Uuid::new_v4();

    let wool = catalog.create(user, "Wool").await.unwrap();
    assert!(catalog.set_active(wool.id, false).await.unwrap());
    assert!(catalog.list(user, true).await.unwrap().is_empty());

    let again = catalog.create(user, "wool").await.unwrap();
    assert_eq!(again.id, wool.id);
    assert!(again.is_active);
}

#[tokio::test]
async fn test_create_rejects_blank_name() {
    let store = InMemoryWardrobe::new();
    let catalog = store.catalog(AttributeKind::Occasion);

    let result = catalog.create(Uuid::new_v4(), "   ").await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn test_create_maps_to_master_case_insensitively() {
    let store = InMemoryWardrobe::new();
    let navy_id = store.add_master(AttributeKind::Color, "Navy", true);
    let catalog = store.catalog(AttributeKind::Color);
    let user = Uuid::new_v4();

    let navy = catalog.create(user, "  NAVY ").await.unwrap();
    assert_eq!(navy.mapped_master_id, Some(navy_id));
    assert_eq!(navy.name, "NAVY");

    let teal = catalog.create(user, "Teal").await.unwrap();
    assert_eq!(teal.mapped_master_id, None);
}

#[tokio::test]
async fn test_entries_are_scoped_per_user() {
    let store = InMemoryWardrobe::new();
    let catalog = store.catalog(AttributeKind::Color);
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let a = catalog.create(alice, "Red").await.unwrap();
    let b = catalog.create(bob, "Red").await.unwrap();

    assert_ne!(a.id, b.id);
    assert_eq!(catalog.list(alice, false).await.unwrap().len(), 1);
    assert_eq!(catalog.list(bob, false).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_orders_active_first_then_by_name() {
    let store = InMemoryWardrobe::new();
    let catalog = store.catalog(AttributeKind::Color);
    let user = Uuid::new_v4();

    for name in ["olive", "Amber", "cobalt", "Beige"] {
        catalog.create(user, name).await.unwrap();
    }
    let amber = catalog.list(user, true).await.unwrap()[0].clone();
    assert_eq!(amber.name, "Amber");
    catalog.set_active(amber.id, false).await.unwrap();

    let all: Vec<String> = catalog
        .list(user, false)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(all, vec!["Beige", "cobalt", "olive", "Amber"]);

    let active: Vec<String> = catalog
        .list(user, true)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(active, vec!["Beige", "cobalt", "olive"]);
}

#[tokio::test]
async fn test_rename_remaps_master_and_reports_missing() {
    let store = InMemoryWardrobe::new();
    let denim_id = store.add_master(AttributeKind::Material, "Denim", true);
    let catalog = store.catalog(AttributeKind::Material);
    let user = Uuid::new_v4();

    let jean = catalog.create(user, "jean fabric").await.unwrap();
    assert_eq!(jean.mapped_master_id, None);

    assert!(catalog.rename(jean.id, " denim ").await.unwrap());
    let renamed = &catalog.list(user, false).await.unwrap()[0];
    assert_eq!(renamed.name, "denim");
    assert_eq!(renamed.mapped_master_id, Some(denim_id));

    assert!(!catalog.rename(Uuid::new_v4(), "Linen").await.unwrap());
    assert!(matches!(
        catalog.rename(jean.id, "  ").await,
        Err(Error::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_rename_onto_existing_name_conflicts() {
    let store = InMemoryWardrobe::new();
    let catalog = store.catalog(AttributeKind::Occasion);
    let user = Uuid::new_v4();

    catalog.create(user, "Work").await.unwrap();
    let party = catalog.create(user, "Party").await.unwrap();

    let result = catalog.rename(party.id, "WORK").await;
    assert!(matches!(result, Err(Error::Conflict(_))));

    // Renaming to a case variant of its own name is fine.
    assert!(catalog.rename(party.id, "party").await.unwrap());
}

#[tokio::test]
async fn test_set_active_reports_missing() {
    let store = InMemoryWardrobe::new();
    let catalog = store.catalog(AttributeKind::Color);
    assert!(!catalog.set_active(Uuid::new_v4(), true).await.unwrap());
}

#[tokio::test]
async fn test_delete_by_non_owner_is_forbidden_and_keeps_row() {
    for kind in AttributeKind::ALL {
        let store = InMemoryWardrobe::new();
        let catalog = store.catalog(kind);
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let entry = catalog.create(owner, "Mine").await.unwrap();
        let result = catalog.delete(entry.id, stranger).await;

        assert!(
            matches!(result, Err(Error::Forbidden(_))),
            "{kind}: expected Forbidden, got {result:?}"
        );
        assert_eq!(store.attribute_count(kind, owner), 1);
    }
}

#[tokio::test]
async fn test_delete_in_use_conflicts_and_keeps_row() {
    for kind in AttributeKind::ALL {
        let store = InMemoryWardrobe::new();
        let catalog = store.catalog(kind);
        let user = Uuid::new_v4();
        let item = Uuid::new_v4();

        store
            .ensure_and_link(kind, item, user, &["Used".to_string()])
            .await
            .unwrap();
        let entry = catalog.list(user, false).await.unwrap()[0].clone();

        let result = catalog.delete(entry.id, user).await;
        assert!(
            matches!(result, Err(Error::Conflict(_))),
            "{kind}: expected Conflict, got {result:?}"
        );
        assert_eq!(store.attribute_count(kind, user), 1);

        // Deactivating is the supported path for an in-use entry.
        assert!(catalog.set_active(entry.id, false).await.unwrap());
    }
}

#[tokio::test]
async fn test_delete_unused_entry() {
    let store = InMemoryWardrobe::new();
    let catalog = store.catalog(AttributeKind::Color);
    let user = Uuid::new_v4();

    let entry = catalog.create(user, "Mauve").await.unwrap();
    assert!(catalog.delete(entry.id, user).await.unwrap());
    assert_eq!(store.attribute_count(AttributeKind::Color, user), 0);

    assert!(!catalog.delete(entry.id, user).await.unwrap());
}

#[tokio::test]
async fn test_options_master_wins_over_user_duplicate() {
    let store = InMemoryWardrobe::new();
    let blue_id = store.add_master(AttributeKind::Color, "blue", true);
    store.add_master(AttributeKind::Color, "Black", true);
    let catalog = store.catalog(AttributeKind::Color);
    let user = Uuid::new_v4();

    catalog.create(user, "BLUE ").await.unwrap();
    let teal = catalog.create(user, "teal").await.unwrap();

    let options = catalog.options(user, true).await.unwrap();
    let names: Vec<&str> = options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Black", "Blue", "Teal"]);

    let blue = &options[1];
    assert_eq!(blue.id, blue_id);
    assert_eq!(blue.source, OptionSource::Master);

    let teal_option = &options[2];
    assert_eq!(teal_option.id, teal.id);
    assert_eq!(teal_option.source, OptionSource::User);
}

#[tokio::test]
async fn test_options_respect_active_filter() {
    let store = InMemoryWardrobe::new()
        .with_master(AttributeKind::Occasion, "Work")
        .with_inactive_master(AttributeKind::Occasion, "Gala");
    let catalog = store.catalog(AttributeKind::Occasion);
    let user = Uuid::new_v4();

    let hike = catalog.create(user, "hike").await.unwrap();
    catalog.set_active(hike.id, false).await.unwrap();

    let active = catalog.options(user, true).await.unwrap();
    let names: Vec<&str> = active.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Work"]);

    let all = catalog.options(user, false).await.unwrap();
    let names: Vec<&str> = all.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Gala", "Hike", "Work"]);
}

#[tokio::test]
async fn test_options_resolve_mapping_for_user_entries() {
    let store = InMemoryWardrobe::new();
    let grey_id = store.add_master(AttributeKind::Color, "grey", false);
    let catalog = store.catalog(AttributeKind::Color);
    let user = Uuid::new_v4();

    let entry = catalog.create(user, "GREY").await.unwrap();
    assert_eq!(entry.mapped_master_id, Some(grey_id));

    // The inactive master is filtered out, so the user entry shows with its mapping.
    let active = catalog.options(user, true).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, entry.id);
    assert_eq!(active[0].name, "Grey");
    assert_eq!(active[0].source, OptionSource::User);
    let mapped = active[0].mapped_to.as_ref().expect("mapping should resolve");
    assert_eq!(mapped.id, grey_id);
    assert_eq!(mapped.name, "Grey");

    // With inactive rows included the master takes the slot.
    let all = catalog.options(user, false).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, grey_id);
    assert_eq!(all[0].source, OptionSource::Master);
}

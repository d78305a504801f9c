use crate::{AppError, BindingId, KeyBindingRegistry, KeyId};

use std::path::Path;

/// WHAT: A key held by one sound cannot be given to another
/// WHY: Each key must trigger exactly one sound
#[test]
fn given_key_bound_to_a_when_binding_to_b_then_already_bound_and_a_unchanged() {
    // Given: 'a' bound to sound #1
    let registry = KeyBindingRegistry::new();
    let key = KeyId::Char('a');
    assert!(
        registry
            .bind(key.clone(), BindingId(1), Path::new("one.wav"))
            .is_ok()
    );

    // When: Binding 'a' to sound #2
    let result = registry.bind(key.clone(), BindingId(2), Path::new("two.wav"));

    // Then: Rejected, naming the holder, and #1 still owns the key
    assert!(matches!(
        &result,
        Err(AppError::AlreadyBound { key: k, bound_to: BindingId(1), .. }) if *k == key
    ));
    assert_eq!(registry.lookup(&key), Some(BindingId(1)));
    let resolved = registry.resolve(&key);
    assert_eq!(
        resolved.map(|r| r.file_path),
        Some(Path::new("one.wav").to_path_buf())
    );
}

/// WHAT: Rebinding a key to the sound that already holds it succeeds
/// WHY: Self-rebind is a no-op, not a conflict
#[test]
fn given_key_bound_to_a_when_binding_again_to_a_then_accepted() {
    // Given: 'x' bound to #4
    let registry = KeyBindingRegistry::new();
    let key = KeyId::Char('x');
    assert!(
        registry
            .bind(key.clone(), BindingId(4), Path::new("old.wav"))
            .is_ok()
    );

    // When: Binding 'x' to #4 again with a refreshed path
    let result = registry.bind(key.clone(), BindingId(4), Path::new("new.wav"));

    // Then: Accepted and refreshed, still one entry
    assert!(result.is_ok());
    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.resolve(&key).map(|r| r.file_path),
        Some(Path::new("new.wav").to_path_buf())
    );
}

/// WHAT: Unbinding removes the entry; unbinding again is harmless
/// WHY: Deleted sounds must stop responding to their key
#[test]
fn given_bound_key_when_unbound_twice_then_lookup_empty() {
    // Given: A named key bound
    let registry = KeyBindingRegistry::new();
    let key = KeyId::Named("f1".to_string());
    assert!(
        registry
            .bind(key.clone(), BindingId(9), Path::new("f1.wav"))
            .is_ok()
    );

    // When: Unbinding it twice
    registry.unbind(&key);
    registry.unbind(&key);

    // Then: Nothing is bound
    assert_eq!(registry.lookup(&key), None);
    assert!(registry.is_empty());
}

/// WHAT: Clones share one map
/// WHY: The listener thread must see writes made by the app thread
#[test]
fn given_cloned_registry_when_writing_through_one_then_other_sees_it() {
    // Given: Two handles to the same registry
    let registry = KeyBindingRegistry::new();
    let listener_view = registry.clone();

    // When: Binding on a different thread through the original handle
    let writer = registry.clone();
    let handle = std::thread::spawn(move || {
        writer
            .bind(KeyId::Char('q'), BindingId(3), Path::new("q.wav"))
            .is_ok()
    });
    assert!(matches!(handle.join(), Ok(true)));

    // Then: The clone resolves it
    assert_eq!(listener_view.lookup(&KeyId::Char('q')), Some(BindingId(3)));
    assert!(listener_view.is_bound_elsewhere(&KeyId::Char('q'), BindingId(1)));
    assert!(!listener_view.is_bound_elsewhere(&KeyId::Char('q'), BindingId(3)));
}

/// WHAT: No key ever maps to two sounds, whatever the order of binds
/// WHY: Registry uniqueness invariant
#[test]
fn given_many_competing_binds_when_applied_then_each_key_has_one_owner() {
    // Given: Ten sounds all trying keys 'a'..'e'
    let registry = KeyBindingRegistry::new();
    let keys: Vec<KeyId> = ('a'..='e').map(KeyId::Char).collect();

    // When: Every sound tries every key
    for id in 1..=10u64 {
        for key in &keys {
            let _ = registry.bind(key.clone(), BindingId(id), Path::new("clip.wav"));
        }
    }

    // Then: Exactly one owner per key, and it is the first binder
    assert_eq!(registry.len(), keys.len());
    for key in &keys {
        assert_eq!(registry.lookup(key), Some(BindingId(1)));
    }
}

use std::path::Path;
use tasklist_core::db::{open_db, open_db_in_memory};
use tasklist_core::{
    default_categories, AnyStore, Category, InitOptions, Outcome, StoreKind, Task, TodoService,
    TodoStore,
};

const KINDS: [StoreKind; 2] = [StoreKind::Normalized, StoreKind::KeyValue];

fn unseeded() -> InitOptions {
    InitOptions {
        seed_default_categories: false,
    }
}

fn empty_service(kind: StoreKind) -> TodoService<AnyStore> {
    let store = AnyStore::new(kind, open_db_in_memory().unwrap());
    TodoService::initialize(store, unseeded()).unwrap()
}

fn service_with_work(kind: StoreKind) -> TodoService<AnyStore> {
    let mut service = empty_service(kind);
    service.add_category(Some("Work"), Some("#0f74cc")).unwrap();
    service
}

fn open_service(kind: StoreKind, path: &Path, options: InitOptions) -> TodoService<AnyStore> {
    let store = AnyStore::new(kind, open_db(path).unwrap());
    TodoService::initialize(store, options).unwrap()
}

fn persisted_tasks(service: &TodoService<AnyStore>, category: &str) -> Vec<Task> {
    service.store().load_tasks(category).unwrap()
}

#[test]
fn add_task_creates_one_outstanding_entry_and_record() {
    for kind in KINDS {
        let mut service = service_with_work(kind);

        let outcome = service.add_task(Some("Buy milk"), Some("Work")).unwrap();

        assert_eq!(outcome, Outcome::Applied, "{kind:?}");
        assert_eq!(service.outstanding(), &[Task::new("Buy milk", "Work")]);
        assert!(service.completed().is_empty());
        assert_eq!(persisted_tasks(&service, "Work"), vec![Task::new("Buy milk", "Work")]);
    }
}

#[test]
fn duplicate_task_is_a_noop_in_either_container() {
    for kind in KINDS {
        let mut service = service_with_work(kind);
        service.add_task(Some("Buy milk"), Some("Work")).unwrap();

        let again = service.add_task(Some("Buy milk"), Some("Work")).unwrap();
        assert_eq!(again, Outcome::Unchanged);
        assert_eq!(service.outstanding().len(), 1);

        service.tick_task(Some("Buy milk"), Some("Work")).unwrap();
        let after_tick = service.add_task(Some("Buy milk"), Some("Work")).unwrap();
        assert_eq!(after_tick, Outcome::Unchanged);
        assert!(service.outstanding().is_empty());
        assert_eq!(service.completed().len(), 1);
        assert_eq!(persisted_tasks(&service, "Work").len(), 1, "{kind:?}");
    }
}

#[test]
fn missing_or_blank_fields_are_silent_noops() {
    for kind in KINDS {
        let mut service = service_with_work(kind);

        assert_eq!(service.add_task(None, Some("Work")).unwrap(), Outcome::Unchanged);
        assert_eq!(service.add_task(Some("  "), Some("Work")).unwrap(), Outcome::Unchanged);
        assert_eq!(service.tick_task(Some("x"), None).unwrap(), Outcome::Unchanged);
        assert_eq!(service.add_category(Some("Home"), None).unwrap(), Outcome::Unchanged);
        assert_eq!(service.remove_category(None, None).unwrap(), Outcome::Unchanged);

        assert!(service.outstanding().is_empty());
        assert_eq!(service.categories().len(), 1);
    }
}

#[test]
fn task_for_unknown_category_is_ignored() {
    for kind in KINDS {
        let mut service = service_with_work(kind);

        let outcome = service.add_task(Some("Dig"), Some("Garden")).unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
        assert!(service.outstanding().is_empty());
    }
}

#[test]
fn tick_moves_task_once_and_ignores_unknown_tasks() {
    for kind in KINDS {
        let mut service = service_with_work(kind);
        service.add_task(Some("Buy milk"), Some("Work")).unwrap();

        assert_eq!(
            service.tick_task(Some("Buy milk"), Some("Work")).unwrap(),
            Outcome::Applied
        );
        assert_eq!(
            service.tick_task(Some("Buy milk"), Some("Work")).unwrap(),
            Outcome::Unchanged
        );
        assert_eq!(
            service.tick_task(Some("Nope"), Some("Work")).unwrap(),
            Outcome::Unchanged
        );

        assert!(service.outstanding().is_empty());
        assert_eq!(service.completed().len(), 1);
        assert!(service.completed()[0].completed);
        assert!(persisted_tasks(&service, "Work")[0].completed, "{kind:?}");
    }
}

#[test]
fn lookups_are_case_sensitive() {
    for kind in KINDS {
        let mut service = service_with_work(kind);
        service.add_task(Some("Buy milk"), Some("Work")).unwrap();

        assert_eq!(
            service.tick_task(Some("buy milk"), Some("Work")).unwrap(),
            Outcome::Unchanged
        );
        assert_eq!(
            service.add_category(Some("work"), Some("#000000")).unwrap(),
            Outcome::Applied
        );
        assert_eq!(service.categories().len(), 2);
    }
}

#[test]
fn remove_only_targets_completed_tasks() {
    for kind in KINDS {
        let mut service = service_with_work(kind);
        service.add_task(Some("Buy milk"), Some("Work")).unwrap();

        assert_eq!(
            service.remove_task(Some("Buy milk"), Some("Work")).unwrap(),
            Outcome::Unchanged
        );
        assert_eq!(service.outstanding().len(), 1);

        service.tick_task(Some("Buy milk"), Some("Work")).unwrap();
        assert_eq!(
            service.remove_task(Some("Buy milk"), Some("Work")).unwrap(),
            Outcome::Applied
        );
        assert!(service.completed().is_empty());
        assert!(persisted_tasks(&service, "Work").is_empty(), "{kind:?}");
    }
}

#[test]
fn removed_task_does_not_reappear_after_restart() {
    for kind in KINDS {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasklist.sqlite3");

        {
            let mut service = open_service(kind, &path, unseeded());
            service.add_category(Some("Work"), Some("#0f74cc")).unwrap();
            service.add_task(Some("Buy milk"), Some("Work")).unwrap();
            service.add_task(Some("Call Bob"), Some("Work")).unwrap();
            service.tick_task(Some("Buy milk"), Some("Work")).unwrap();
            service.remove_task(Some("Buy milk"), Some("Work")).unwrap();
        }

        let reloaded = open_service(kind, &path, unseeded());
        assert!(reloaded.completed().is_empty(), "{kind:?}");
        assert_eq!(reloaded.outstanding(), &[Task::new("Call Bob", "Work")]);
    }
}

#[test]
fn restart_reproduces_the_working_set() {
    for kind in KINDS {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasklist.sqlite3");

        let before = {
            let mut service = open_service(kind, &path, InitOptions::default());
            service.add_category(Some("Errands"), Some("#123456")).unwrap();
            service.add_task(Some("Report"), Some("Work")).unwrap();
            service.add_task(Some("Weed"), Some("Garden")).unwrap();
            service.add_task(Some("Stamps"), Some("Errands")).unwrap();
            service.tick_task(Some("Weed"), Some("Garden")).unwrap();
            service.working_set().clone()
        };

        let reloaded = open_service(kind, &path, InitOptions::default());
        assert_eq!(reloaded.working_set(), &before, "{kind:?}");
    }
}

#[test]
fn add_category_is_unique_by_name() {
    for kind in KINDS {
        let mut service = service_with_work(kind);

        let outcome = service.add_category(Some("Work"), Some("#ffffff")).unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(service.categories().len(), 1);
        assert_eq!(service.categories()[0].color, "#0f74cc");
        assert_eq!(service.store().load_categories().unwrap().len(), 1);
    }
}

#[test]
fn normalized_store_assigns_category_ids() {
    let service = service_with_work(StoreKind::Normalized);
    assert!(service.categories()[0].id.is_some());

    let kv = service_with_work(StoreKind::KeyValue);
    assert!(kv.categories()[0].id.is_none());
}

#[test]
fn remove_category_cascades_to_all_its_tasks() {
    for kind in KINDS {
        let mut service = service_with_work(kind);
        service.add_category(Some("Home"), Some("#5db7c6")).unwrap();
        service.add_task(Some("a"), Some("Work")).unwrap();
        service.add_task(Some("b"), Some("Work")).unwrap();
        service.add_task(Some("c"), Some("Home")).unwrap();
        service.tick_task(Some("b"), Some("Work")).unwrap();

        let outcome = service.remove_category(Some("Work"), Some("#0f74cc")).unwrap();

        assert_eq!(outcome, Outcome::Applied);
        let remaining: Vec<&Category> = service.categories().iter().collect();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Home");
        assert_eq!(service.outstanding(), &[Task::new("c", "Home")]);
        assert!(service.completed().is_empty());
        assert!(persisted_tasks(&service, "Work").is_empty(), "{kind:?}");
        assert_eq!(service.store().load_categories().unwrap().len(), 1);
    }
}

#[test]
fn remove_category_requires_matching_color() {
    for kind in KINDS {
        let mut service = service_with_work(kind);
        service.add_task(Some("a"), Some("Work")).unwrap();

        let outcome = service.remove_category(Some("Work"), Some("#000000")).unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(service.categories().len(), 1);
        assert_eq!(service.outstanding().len(), 1);
    }
}

#[test]
fn reset_always_yields_the_three_defaults() {
    for kind in KINDS {
        let mut service = empty_service(kind);
        service.add_category(Some("Custom"), Some("#abcdef")).unwrap();
        service.add_category(Some("Work"), Some("#000000")).unwrap();

        service.reset_categories().unwrap();
        service.reset_categories().unwrap();

        let names_colors: Vec<_> = service
            .categories()
            .iter()
            .map(|c| (c.name.clone(), c.color.clone()))
            .collect();
        let expected: Vec<_> = default_categories()
            .into_iter()
            .map(|c| (c.name, c.color))
            .collect();
        assert_eq!(names_colors, expected, "{kind:?}");

        let persisted: Vec<_> = service
            .store()
            .load_categories()
            .unwrap()
            .into_iter()
            .map(|c| (c.name, c.color))
            .collect();
        assert_eq!(persisted, expected, "{kind:?}");
    }
}

#[test]
fn reset_drops_tasks_of_removed_categories_only() {
    for kind in KINDS {
        let mut service = empty_service(kind);
        service.add_category(Some("Work"), Some("#0f74cc")).unwrap();
        service.add_category(Some("Custom"), Some("#abcdef")).unwrap();
        service.add_task(Some("Report"), Some("Work")).unwrap();
        service.add_task(Some("Odd job"), Some("Custom")).unwrap();

        service.reset_categories().unwrap();

        assert_eq!(service.outstanding(), &[Task::new("Report", "Work")]);
        assert_eq!(persisted_tasks(&service, "Work").len(), 1, "{kind:?}");
        assert!(persisted_tasks(&service, "Custom").is_empty(), "{kind:?}");
    }
}

#[test]
fn empty_store_is_seeded_with_defaults_when_enabled() {
    for kind in KINDS {
        let store = AnyStore::new(kind, open_db_in_memory().unwrap());
        let service = TodoService::initialize(store, InitOptions::default()).unwrap();

        assert_eq!(service.categories().len(), 3);
        assert_eq!(service.store().load_categories().unwrap().len(), 3);
    }
}

#[test]
fn end_to_end_task_lifecycle() {
    for kind in KINDS {
        let mut service = empty_service(kind);
        assert!(service.categories().is_empty());

        service.add_category(Some("Work"), Some("#0f74cc")).unwrap();
        service.add_task(Some("Buy milk"), Some("Work")).unwrap();
        assert!(service
            .outstanding()
            .iter()
            .any(|task| task.matches("Buy milk", "Work")));

        service.tick_task(Some("Buy milk"), Some("Work")).unwrap();
        assert!(service.outstanding().is_empty());
        assert!(service
            .completed()
            .iter()
            .any(|task| task.matches("Buy milk", "Work")));

        service.remove_task(Some("Buy milk"), Some("Work")).unwrap();
        assert!(service.outstanding().is_empty());
        assert!(service.completed().is_empty());
        assert!(persisted_tasks(&service, "Work").is_empty(), "{kind:?}");
    }
}

#[test]
fn category_name_the_store_refuses_never_reaches_memory() {
    let mut service = empty_service(StoreKind::KeyValue);

    let outcome = service.add_category(Some("categories"), Some("#000000")).unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    assert!(service.categories().is_empty());

    let outcome = service.add_task(Some("x"), Some("categories")).unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    assert!(service.outstanding().is_empty());
    assert!(service.store().load_categories().unwrap().is_empty());

    let mut normalized = empty_service(StoreKind::Normalized);
    let outcome = normalized.add_category(Some("categories"), Some("#000000")).unwrap();
    assert_eq!(outcome, Outcome::Applied);
}

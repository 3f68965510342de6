use std::cell::{Cell, RefCell};
use tidytask_core::db::DbError;
use tidytask_core::{
    RepoError, RepoResult, SqliteTaskStore, StoreLocation, Task, TaskIntent, TaskRepository,
    TaskService, TaskStatus,
};

/// In-memory repository double with call counting and switchable write
/// failures, substituted through the `TaskRepository` seam.
#[derive(Default)]
struct FakeRepo {
    rows: RefCell<Vec<Task>>,
    next_id: Cell<i64>,
    calls: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl FakeRepo {
    fn seeded(texts: &[&str]) -> Self {
        let repo = Self::default();
        {
            let mut rows = repo.rows.borrow_mut();
            for (index, text) in texts.iter().enumerate() {
                rows.push(Task::from_parts(
                    index as i64 + 1,
                    *text,
                    TaskStatus::New,
                    false,
                    "2024-01-01 10:00:00",
                ));
            }
        }
        repo.next_id.set(texts.len() as i64);
        repo
    }

    fn write_failure() -> RepoError {
        RepoError::Db(DbError::Sqlite(rusqlite::Error::InvalidQuery))
    }

    fn record_call(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl TaskRepository for &FakeRepo {
    fn fetch_all(&self) -> RepoResult<Vec<Task>> {
        self.record_call();
        Ok(self.rows.borrow().clone())
    }

    fn add_task(&self, task: &Task) -> RepoResult<i64> {
        self.record_call();
        if self.fail_writes.get() {
            return Err(FakeRepo::write_failure());
        }

        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let mut stored = task.clone();
        stored.id = Some(id);
        self.rows.borrow_mut().push(stored);
        Ok(id)
    }

    fn update_task(&self, status: TaskStatus, done: bool, id: i64) -> RepoResult<()> {
        self.record_call();
        if self.fail_writes.get() {
            return Err(FakeRepo::write_failure());
        }

        let mut rows = self.rows.borrow_mut();
        let Some(row) = rows.iter_mut().find(|task| task.id == Some(id)) else {
            return Err(RepoError::NotFound(id));
        };
        row.status = status;
        row.done = done;
        Ok(())
    }

    fn remove_task(&self, id: i64) -> RepoResult<()> {
        self.record_call();
        if self.fail_writes.get() {
            return Err(FakeRepo::write_failure());
        }

        let mut rows = self.rows.borrow_mut();
        let Some(index) = rows.iter().position(|task| task.id == Some(id)) else {
            return Err(RepoError::NotFound(id));
        };
        rows.remove(index);
        Ok(())
    }
}

#[test]
fn blank_and_placeholder_input_is_rejected_before_any_store_call() {
    let repo = FakeRepo::default();
    let mut service = TaskService::new(&repo).with_input_placeholder("Add a new task...");

    assert!(service.add_task("").unwrap().is_none());
    assert!(service.add_task("   ").unwrap().is_none());
    assert!(service.add_task("Add a new task...").unwrap().is_none());

    assert_eq!(repo.calls.get(), 0);
    assert!(service.tasks().is_empty());
}

#[test]
fn add_task_appends_and_records_store_assigned_id() {
    let repo = FakeRepo::default();
    let mut service = TaskService::new(&repo);

    {
        let added = service.add_task("Buy milk").unwrap().unwrap();
        assert_eq!(added.id, Some(1));
        assert_eq!(added.text, "Buy milk");
    }

    assert_eq!(service.tasks().len(), 1);
    assert_eq!(repo.rows.borrow().len(), 1);
}

#[test]
fn failed_insert_does_not_append_to_the_list() {
    let repo = FakeRepo::default();
    let mut service = TaskService::new(&repo);
    repo.fail_writes.set(true);

    let err = service.add_task("Buy milk").unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(service.tasks().is_empty());
    assert!(repo.rows.borrow().is_empty());
}

#[test]
fn failed_update_rolls_back_the_in_memory_toggle() {
    let repo = FakeRepo::seeded(&["Buy milk"]);
    let mut service = TaskService::new(&repo);
    service.load_tasks().unwrap();

    repo.fail_writes.set(true);
    let err = service.toggle_task(1).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    let task = &service.tasks()[0];
    assert!(!task.done);
    assert_eq!(task.status, TaskStatus::New);
    assert!(!repo.rows.borrow()[0].done);
}

#[test]
fn toggle_task_persists_both_completion_fields() {
    let repo = FakeRepo::seeded(&["Buy milk"]);
    let mut service = TaskService::new(&repo);
    service.load_tasks().unwrap();

    {
        let toggled = service.toggle_task(1).unwrap();
        assert!(toggled.done);
        assert_eq!(toggled.status, TaskStatus::Done);
    }

    let rows = repo.rows.borrow();
    assert!(rows[0].done);
    assert_eq!(rows[0].status, TaskStatus::Done);
}

#[test]
fn failed_delete_keeps_the_task_in_the_list() {
    let repo = FakeRepo::seeded(&["Buy milk"]);
    let mut service = TaskService::new(&repo);
    service.load_tasks().unwrap();

    repo.fail_writes.set(true);
    let err = service.remove_task(1).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    assert_eq!(service.tasks().len(), 1);
    assert_eq!(repo.rows.borrow().len(), 1);
}

#[test]
fn remove_task_deletes_from_store_and_list() {
    let repo = FakeRepo::seeded(&["Buy milk", "Water plants"]);
    let mut service = TaskService::new(&repo);
    service.load_tasks().unwrap();

    service.remove_task(1).unwrap();

    assert_eq!(service.tasks().len(), 1);
    assert_eq!(service.tasks()[0].text, "Water plants");
    assert_eq!(repo.rows.borrow().len(), 1);
}

#[test]
fn toggle_of_externally_removed_task_resyncs_the_list() {
    let repo = FakeRepo::seeded(&["Buy milk"]);
    let mut service = TaskService::new(&repo);
    service.load_tasks().unwrap();

    repo.rows.borrow_mut().clear();

    let err = service.toggle_task(1).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(1)));
    assert!(service.tasks().is_empty());
}

#[test]
fn mutation_of_unknown_id_resyncs_from_the_store() {
    let repo = FakeRepo::seeded(&["Buy milk"]);
    let mut service = TaskService::new(&repo);

    // The list was never loaded, so memory and store have diverged.
    let err = service.remove_task(1).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(1)));
    assert_eq!(service.tasks().len(), 1);
}

#[test]
fn load_tasks_mirrors_store_rows_in_order() {
    let repo = FakeRepo::seeded(&["first", "second"]);
    let mut service = TaskService::new(&repo);

    let snapshot = service.load_tasks().unwrap();
    let texts: Vec<&str> = snapshot.iter().map(|task| task.text.as_str()).collect();
    assert_eq!(texts, ["first", "second"]);
}

#[test]
fn apply_dispatches_each_intent() {
    let repo = FakeRepo::default();
    let mut service = TaskService::new(&repo);

    service
        .apply(TaskIntent::Add("Buy milk".to_string()))
        .unwrap();
    assert_eq!(service.tasks().len(), 1);

    service.apply(TaskIntent::Toggle(1)).unwrap();
    assert!(service.tasks()[0].done);

    service.apply(TaskIntent::Remove(1)).unwrap();
    assert!(service.tasks().is_empty());
}

#[test]
fn service_round_trip_over_the_sqlite_store() {
    let store = SqliteTaskStore::connect(&StoreLocation::Memory).unwrap();
    let mut service = TaskService::new(store);
    service.load_tasks().unwrap();

    service.add_task("Buy milk").unwrap();
    let id = service.tasks()[0].id.unwrap();

    service.toggle_task(id).unwrap();
    assert!(service.tasks()[0].done);
    assert_eq!(service.tasks()[0].status, TaskStatus::Done);

    service.remove_task(id).unwrap();
    assert!(service.tasks().is_empty());
}

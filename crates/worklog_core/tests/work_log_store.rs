use rusqlite::Connection;
use worklog_core::db::open_db_in_memory;
use worklog_core::{
    parse_day, BulkOperation, DayFilter, DistinctField, RepoError, SearchCriteria, Selector,
    SqliteWorkLogStore, TagUpdate, TimeUnit, WorkLogRecord, WorkLogStore,
};

fn record(employee: &str, day: &str, tags: &[&str]) -> WorkLogRecord {
    WorkLogRecord::new(
        employee,
        parse_day(day).unwrap(),
        60,
        tags.iter().map(|tag| tag.to_string()).collect(),
    )
}

fn seed(store: &SqliteWorkLogStore<'_>, records: &[WorkLogRecord]) {
    for record in records {
        store.insert_record(record).unwrap();
    }
}

#[test]
fn insert_and_get_preserves_tag_order_and_note() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteWorkLogStore::try_new(&conn).unwrap();

    let created = record("james.bond", "2020/01/02", &["zeta", "alpha", "mid"]).with_note("n");
    let id = store.insert_record(&created).unwrap();

    let loaded = store.get_record(&id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.tags, vec!["zeta", "alpha", "mid"]);
    assert!(store.get_record("WL.missing").unwrap().is_none());
}

#[test]
fn insert_rejects_invalid_records() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteWorkLogStore::try_new(&conn).unwrap();

    let mut invalid = record("u", "2020/01/02", &["a"]);
    invalid.day = "2020-01-02".to_string();
    let err = store.insert_record(&invalid).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn try_new_requires_migrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteWorkLogStore::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("work_logs")));
}

#[test]
fn find_applies_every_dimension() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteWorkLogStore::try_new(&conn).unwrap();
    seed(
        &store,
        &[
            record("james.bond", "2019/04/01", &["talkie", "nvm"]),
            record("james.bond", "2019/05/01", &["talkie"]),
            record("jane", "2019/04/10", &["talkie"]),
            record("james.bond", "2019/04/20", &["other"]),
        ],
    );

    let criteria = SearchCriteria::compose(
        Selector::exact(Some("james.bond")),
        Selector::any_of(&["talkie".to_string()]),
        DayFilter::time_unit(Some(&TimeUnit::year_month(2019, 4).unwrap())),
    );
    let found = store.find(&criteria).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].day, "2019/04/01");

    assert_eq!(store.find(&SearchCriteria::all()).unwrap().len(), 4);
}

#[test]
fn find_supports_ranges_and_exact_days() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteWorkLogStore::try_new(&conn).unwrap();
    seed(
        &store,
        &[
            record("u", "2020/01/01", &["a"]),
            record("u", "2020/01/15", &["a"]),
            record("u", "2020/02/01", &["a"]),
        ],
    );

    let from = parse_day("2020/01/15");
    let to = parse_day("2020/02/01");
    let days = |filter: Option<DayFilter>| -> Vec<String> {
        store
            .find(&SearchCriteria::compose(None, None, filter))
            .unwrap()
            .into_iter()
            .map(|record| record.day)
            .collect()
    };

    assert_eq!(days(DayFilter::range(from, None)), ["2020/01/15", "2020/02/01"]);
    assert_eq!(days(DayFilter::range(None, from)), ["2020/01/01", "2020/01/15"]);
    assert_eq!(days(DayFilter::range(from, to)), ["2020/01/15", "2020/02/01"]);
    assert_eq!(days(DayFilter::date(to)), ["2020/02/01"]);
}

#[test]
fn find_agrees_with_reference_matching() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteWorkLogStore::try_new(&conn).unwrap();
    let records = vec![
        record("a", "2021/03/01", &["x", "y"]),
        record("b", "2021/03/02", &["y"]),
        record("a", "2021/04/02", &["z"]),
        record("c", "2022/03/01", &["x"]),
    ];
    seed(&store, &records);

    let criteria_list = [
        SearchCriteria::compose(Selector::any_of(&["a".to_string(), "c".to_string()]), None, None),
        SearchCriteria::compose(None, Selector::exact(Some("y")), None),
        SearchCriteria::compose(
            None,
            None,
            DayFilter::time_units(&[
                TimeUnit::year_month(2021, 3).unwrap(),
                TimeUnit::year_month_day(2022, 3, 1).unwrap(),
            ]),
        ),
    ];
    for criteria in criteria_list {
        let mut expected: Vec<String> = records
            .iter()
            .filter(|record| criteria.matches(record))
            .map(|record| record.id.clone())
            .collect();
        let mut actual: Vec<String> = store
            .find(&criteria)
            .unwrap()
            .into_iter()
            .map(|record| record.id)
            .collect();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected, "criteria {criteria:?}");
    }
}

#[test]
fn distinct_lists_owners_and_tags() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteWorkLogStore::try_new(&conn).unwrap();
    seed(
        &store,
        &[
            record("b", "2020/01/01", &["y", "x"]),
            record("a", "2020/01/02", &["x"]),
            record("a", "2020/03/02", &["w"]),
        ],
    );

    let owners = store
        .distinct(DistinctField::Employee, &SearchCriteria::all())
        .unwrap();
    assert_eq!(owners, ["a", "b"]);

    let january = SearchCriteria::compose(
        None,
        None,
        DayFilter::time_unit(Some(&TimeUnit::year_month(2020, 1).unwrap())),
    );
    let tags = store.distinct(DistinctField::Tag, &january).unwrap();
    assert_eq!(tags, ["x", "y"]);
}

#[test]
fn bulk_apply_reports_per_step_counts_and_appends_tags() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteWorkLogStore::try_new(&conn).unwrap();
    let first = record("u", "2020/01/01", &["a", "b"]);
    let second = record("u", "2020/01/02", &["c"]);
    seed(&store, &[first.clone(), second.clone()]);

    let result = store
        .bulk_apply(&[
            BulkOperation {
                criteria: SearchCriteria::all(),
                update: TagUpdate::AddToSet(vec!["c".into(), "d".into()]),
            },
            BulkOperation {
                criteria: SearchCriteria::all(),
                update: TagUpdate::Pull(vec!["a".into()]),
            },
            BulkOperation {
                criteria: SearchCriteria::all(),
                update: TagUpdate::Pull(vec!["missing".into()]),
            },
        ])
        .unwrap();

    assert_eq!(result.modified_counts, vec![2, 1, 0]);
    assert_eq!(
        store.get_record(&first.id).unwrap().unwrap().tags,
        ["b", "c", "d"]
    );
    assert_eq!(
        store.get_record(&second.id).unwrap().unwrap().tags,
        ["c", "d"]
    );
}

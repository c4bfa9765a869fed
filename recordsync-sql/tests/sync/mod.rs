use recordsync_core::{Collection, CollectionKind, Dialect, Field, FieldType};
use recordsync_sql::{Sql, TableInfoRow};
use serde_json::{json, Value};
use sqlx::Database;

pub fn posts() -> Collection {
    Collection::new("posts", CollectionKind::Base)
        .with_id("pbc_posts")
        .field(Field::new("f1", "title", FieldType::Text))
        .field(Field::new("f2", "body", FieldType::Text))
}

pub async fn insert<DB>(
    sql: &Sql<DB>,
    table: &str,
    columns: &[&str],
    values: &[&str],
) -> anyhow::Result<()>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: sqlx::Executor<'e, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    String: for<'q> sqlx::Encode<'q, DB> + sqlx::Type<DB>,
{
    let dialect = Sql::<DB>::dialect()?;
    let names = columns
        .iter()
        .map(|c| dialect.quote(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; values.len()].join(", ");
    let statement = format!(
        "INSERT INTO {} ({names}) VALUES ({placeholders})",
        dialect.quote(table)
    );

    let mut query = sqlx::query::<DB>(&statement);
    for value in values {
        query = query.bind(value.to_string());
    }

    query.execute(sql.pool()).await?;

    Ok(())
}

/// Values of `column` as text, ordered by record id.
pub async fn values<DB>(sql: &Sql<DB>, table: &str, column: &str) -> anyhow::Result<Vec<String>>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: sqlx::Executor<'e, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
{
    let dialect = Sql::<DB>::dialect()?;
    let cast = match dialect {
        Dialect::MySql => "CHAR",
        Dialect::Sqlite => "TEXT",
    };
    let statement = format!(
        "SELECT COALESCE(CAST({} AS {cast}), '') FROM {} ORDER BY {}",
        dialect.quote(column),
        dialect.quote(table),
        dialect.quote("id")
    );

    let rows = sqlx::query_as::<DB, (String,)>(&statement)
        .fetch_all(sql.pool())
        .await?;

    Ok(rows.into_iter().map(|(value,)| value).collect())
}

fn parse_json(values: Vec<String>) -> anyhow::Result<Vec<Value>> {
    values
        .iter()
        .map(|v| Ok(serde_json::from_str::<Value>(v)?))
        .collect()
}

pub async fn create_collections<DB>(sql: &Sql<DB>) -> anyhow::Result<()>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: sqlx::Executor<'e, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    String: for<'q> sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    (i64,): for<'r> sqlx::FromRow<'r, DB::Row>,
    TableInfoRow: for<'r> sqlx::FromRow<'r, DB::Row>,
{
    let posts = posts()
        .field(Field::new("f3", "tags", FieldType::Select).max_select(3))
        .index("CREATE INDEX idx_posts_title ON posts (title)");
    let users = Collection::new("users", CollectionKind::Auth)
        .field(Field::new("u1", "nickname", FieldType::Text));
    let params = Collection::new("_params", CollectionKind::Base);

    let report = sql.sync(&posts, None).await?;
    assert_eq!(report.created_table.as_deref(), Some("posts"));
    assert_eq!(report.created_indexes, vec!["idx_posts_title".to_owned()]);

    sql.sync(&users, None).await?;
    sql.sync(&params, None).await?;

    assert!(sql.has_table("posts").await?);
    assert!(sql.has_table("users").await?);
    assert!(sql.has_table("_params").await?);
    assert!(!sql.has_table("comments").await?);

    assert_eq!(
        sql.table_columns("posts").await?,
        vec!["id", "created", "updated", "title", "body", "tags"]
    );
    assert_eq!(
        sql.table_columns("users").await?,
        vec![
            "id",
            "created",
            "updated",
            "username",
            "email",
            "emailVisibility",
            "verified",
            "tokenKey",
            "passwordHash",
            "lastResetSentAt",
            "lastVerificationSentAt",
            "nickname",
        ]
    );
    assert_eq!(
        sql.table_columns("_params").await?,
        vec!["id", "created", "updated", "value"]
    );

    let info = sql.table_info("posts").await?;
    assert!(info[0].is_primary_key());
    assert!(info[3].is_not_null());
    assert!(!info[3].is_primary_key());

    assert!(sql.has_index("posts", "idx_posts_title").await?);
    for column in ["username", "email", "tokenKey"] {
        let index = format!("_{}_{column}_idx", users.id);
        assert!(sql.has_index("users", &index).await?, "missing {index}");
    }

    Ok(())
}

pub async fn migrate_columns<DB>(sql: &Sql<DB>) -> anyhow::Result<()>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: sqlx::Executor<'e, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    String: for<'q> sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    (i64,): for<'r> sqlx::FromRow<'r, DB::Row>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
    TableInfoRow: for<'r> sqlx::FromRow<'r, DB::Row>,
{
    let old = posts().field(Field::new("f3", "views", FieldType::Number));
    sql.sync(&old, None).await?;
    insert(sql, "posts", &["id", "title", "body"], &["r1", "hello", "world"]).await?;

    let mut new = posts().field(Field::new("f4", "summary", FieldType::Text));
    new.fields[0].name = "headline".to_owned();

    let report = sql.sync(&new, Some(&old)).await?;

    assert_eq!(report.dropped_columns, vec!["views".to_owned()]);
    assert_eq!(report.added_columns, vec!["summary".to_owned()]);
    assert_eq!(
        report.renamed_columns,
        vec![("title".to_owned(), "headline".to_owned())]
    );
    assert_eq!(
        sql.table_columns("posts").await?,
        vec!["id", "created", "updated", "headline", "body", "summary"]
    );
    assert_eq!(values(sql, "posts", "headline").await?, vec!["hello"]);
    assert_eq!(values(sql, "posts", "body").await?, vec!["world"]);
    assert_eq!(values(sql, "posts", "summary").await?, vec![""]);

    Ok(())
}

pub async fn rename_table<DB>(sql: &Sql<DB>) -> anyhow::Result<()>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: sqlx::Executor<'e, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    String: for<'q> sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    (i64,): for<'r> sqlx::FromRow<'r, DB::Row>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
    TableInfoRow: for<'r> sqlx::FromRow<'r, DB::Row>,
{
    let old = posts().index("CREATE INDEX idx_posts_title ON posts (title)");
    sql.sync(&old, None).await?;
    insert(sql, "posts", &["id", "title"], &["r1", "hello"]).await?;

    let mut new = old.clone();
    new.name = "articles".to_owned();
    new.indexes = vec!["CREATE INDEX idx_articles_title ON articles (title)".to_owned()];

    let report = sql.sync(&new, Some(&old)).await?;

    assert_eq!(
        report.renamed_table,
        Some(("posts".to_owned(), "articles".to_owned()))
    );
    assert!(!sql.has_table("posts").await?);
    assert!(sql.has_table("articles").await?);
    assert!(sql.has_index("articles", "idx_articles_title").await?);
    assert!(!sql.has_index("articles", "idx_posts_title").await?);
    assert_eq!(values(sql, "articles", "title").await?, vec!["hello"]);

    Ok(())
}

pub async fn swap_names<DB>(sql: &Sql<DB>) -> anyhow::Result<()>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: sqlx::Executor<'e, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    String: for<'q> sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    (i64,): for<'r> sqlx::FromRow<'r, DB::Row>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
    TableInfoRow: for<'r> sqlx::FromRow<'r, DB::Row>,
{
    let old = posts();
    sql.sync(&old, None).await?;
    insert(sql, "posts", &["id", "title", "body"], &["r1", "T", "B"]).await?;

    let mut new = posts();
    new.fields[0].name = "body".to_owned();
    new.fields[1].name = "title".to_owned();

    let report = sql.sync(&new, Some(&old)).await?;

    assert_eq!(report.renamed_columns.len(), 2);
    assert_eq!(
        sql.table_columns("posts").await?,
        vec!["id", "created", "updated", "body", "title"]
    );
    assert_eq!(values(sql, "posts", "body").await?, vec!["T"]);
    assert_eq!(values(sql, "posts", "title").await?, vec!["B"]);

    Ok(())
}

pub async fn multiple_to_single<DB>(sql: &Sql<DB>) -> anyhow::Result<()>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: sqlx::Executor<'e, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    String: for<'q> sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    (i64,): for<'r> sqlx::FromRow<'r, DB::Row>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
    TableInfoRow: for<'r> sqlx::FromRow<'r, DB::Row>,
{
    let old = posts().field(Field::new("f3", "tags", FieldType::Select).max_select(3));
    sql.sync(&old, None).await?;
    insert(sql, "posts", &["id", "tags"], &["r1", r#"["a","b"]"#]).await?;
    insert(sql, "posts", &["id", "tags"], &["r2", "[]"]).await?;
    insert(sql, "posts", &["id", "tags"], &["r3", r#"["x","y","z"]"#]).await?;

    let new = posts().field(Field::new("f3", "tag", FieldType::Select).max_select(1));

    let report = sql.sync(&new, Some(&old)).await?;

    assert_eq!(
        report.renamed_columns,
        vec![("tags".to_owned(), "tag".to_owned())]
    );
    assert_eq!(report.normalized_fields, vec!["tag".to_owned()]);
    assert_eq!(
        sql.table_columns("posts").await?,
        vec!["id", "created", "updated", "title", "body", "tag"]
    );
    assert_eq!(values(sql, "posts", "tag").await?, vec!["a", "", "x"]);

    Ok(())
}

pub async fn cardinality_round_trip<DB>(sql: &Sql<DB>) -> anyhow::Result<()>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: sqlx::Executor<'e, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    String: for<'q> sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    (i64,): for<'r> sqlx::FromRow<'r, DB::Row>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
    TableInfoRow: for<'r> sqlx::FromRow<'r, DB::Row>,
{
    let single = posts().field(Field::new("f3", "tag", FieldType::Select).max_select(1));
    sql.sync(&single, None).await?;
    insert(sql, "posts", &["id", "tag"], &["r1", "a"]).await?;
    insert(sql, "posts", &["id", "tag"], &["r2", ""]).await?;

    let multiple = posts().field(Field::new("f3", "tag", FieldType::Select).max_select(3));
    sql.sync(&multiple, Some(&single)).await?;

    assert_eq!(
        parse_json(values(sql, "posts", "tag").await?)?,
        vec![json!(["a"]), json!([])]
    );

    sql.sync(&single, Some(&multiple)).await?;

    assert_eq!(values(sql, "posts", "tag").await?, vec!["a", ""]);

    Ok(())
}

pub async fn non_array_values_kept<DB>(sql: &Sql<DB>) -> anyhow::Result<()>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: sqlx::Executor<'e, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    String: for<'q> sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    (i64,): for<'r> sqlx::FromRow<'r, DB::Row>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
    TableInfoRow: for<'r> sqlx::FromRow<'r, DB::Row>,
{
    let multiple = posts().field(Field::new("f3", "tag", FieldType::Select).max_select(3));
    sql.sync(&multiple, None).await?;
    insert(sql, "posts", &["id", "tag"], &["r1", r#"["a","b"]"#]).await?;
    insert(sql, "posts", &["id", "tag"], &["r2", r#"{"a":1}"#]).await?;

    let single = posts().field(Field::new("f3", "tag", FieldType::Select).max_select(1));
    let report = sql.sync(&single, Some(&multiple)).await?;

    assert_eq!(report.normalized_fields, vec!["tag".to_owned()]);

    let tags = values(sql, "posts", "tag").await?;
    assert_eq!(tags[0], "a");
    assert_eq!(serde_json::from_str::<Value>(&tags[1])?, json!({ "a": 1 }));

    Ok(())
}

pub async fn arrays_kept_when_becoming_multiple<DB>(sql: &Sql<DB>) -> anyhow::Result<()>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: sqlx::Executor<'e, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    String: for<'q> sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    (i64,): for<'r> sqlx::FromRow<'r, DB::Row>,
    (String,): for<'r> sqlx::FromRow<'r, DB::Row>,
    TableInfoRow: for<'r> sqlx::FromRow<'r, DB::Row>,
{
    let single = posts().field(Field::new("f3", "tag", FieldType::Select).max_select(1));
    sql.sync(&single, None).await?;
    insert(sql, "posts", &["id", "tag"], &["r1", r#"["a","b"]"#]).await?;
    insert(sql, "posts", &["id", "tag"], &["r2", "a"]).await?;
    insert(sql, "posts", &["id", "tag"], &["r3", ""]).await?;

    let multiple = posts().field(Field::new("f3", "tag", FieldType::Select).max_select(3));
    let report = sql.sync(&multiple, Some(&single)).await?;

    assert_eq!(report.normalized_fields, vec!["tag".to_owned()]);
    assert_eq!(
        parse_json(values(sql, "posts", "tag").await?)?,
        vec![json!(["a", "b"]), json!(["a"]), json!([])]
    );

    Ok(())
}

pub async fn rebuild_indexes<DB>(sql: &Sql<DB>) -> anyhow::Result<()>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: sqlx::Executor<'e, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    String: for<'q> sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    (i64,): for<'r> sqlx::FromRow<'r, DB::Row>,
    TableInfoRow: for<'r> sqlx::FromRow<'r, DB::Row>,
{
    let old = posts().index("CREATE INDEX idx_a ON posts (title)");
    sql.sync(&old, None).await?;

    let new = posts().index("CREATE UNIQUE INDEX idx_b ON posts (title, body)");
    let report = sql.sync(&new, Some(&old)).await?;

    assert_eq!(report.dropped_indexes, vec!["idx_a".to_owned()]);
    assert_eq!(report.created_indexes, vec!["idx_b".to_owned()]);
    assert!(!sql.has_index("posts", "idx_a").await?);
    assert!(sql.has_index("posts", "idx_b").await?);

    // unchanged collection, indexes are dropped and created again
    let report = sql.sync(&new, Some(&new)).await?;

    assert!(report.added_columns.is_empty());
    assert_eq!(report.dropped_indexes, vec!["idx_b".to_owned()]);
    assert!(sql.has_index("posts", "idx_b").await?);

    Ok(())
}

pub async fn reconcile_indexes<DB>(sql: &Sql<DB>) -> anyhow::Result<()>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: sqlx::Executor<'e, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    String: for<'q> sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    (i64,): for<'r> sqlx::FromRow<'r, DB::Row>,
    TableInfoRow: for<'r> sqlx::FromRow<'r, DB::Row>,
{
    let collection = posts();
    sql.sync(&collection, None).await?;
    insert(sql, "posts", &["id", "title"], &["r1", "same"]).await?;
    insert(sql, "posts", &["id", "title"], &["r2", "same"]).await?;

    let collection = collection
        .index("CREATE INDEX idx_posts_body ON posts (body)")
        .index("CREATE INDEX broken")
        .index("CREATE UNIQUE INDEX idx_posts_title ON posts (title)")
        .index("CREATE INDEX idx_posts_nope ON posts (nope)");

    let err = sql.reconcile_indexes(&collection).await.unwrap_err();
    let errors = err.index_errors().expect("index errors");

    assert_eq!(
        errors.iter().map(|(position, _)| position).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(
        errors.get(1).and_then(|e| e.message.as_deref()),
        Some("Invalid CREATE INDEX expression.")
    );
    assert!(errors
        .get(2)
        .and_then(|e| e.message.as_deref())
        .is_some_and(|m| m.starts_with("Failed to create index idx_posts_title - ")));
    assert!(errors
        .get(3)
        .and_then(|e| e.message.as_deref())
        .is_some_and(|m| m.starts_with("Failed to create index idx_posts_nope - ")));

    assert!(sql.has_index("posts", "idx_posts_body").await?);
    assert!(!sql.has_index("posts", "idx_posts_title").await?);
    assert!(!sql.has_index("posts", "idx_posts_nope").await?);

    Ok(())
}

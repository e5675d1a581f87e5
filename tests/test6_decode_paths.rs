use sql_records::decode::{DecoderConfig, FromRowValue};
use sql_records::prelude::*;
use sql_records::test_utils::{MockExecutor, MockRows};

#[derive(Debug, Default, Clone, PartialEq)]
struct Product {
    id: i64,
    price: f64,
}

sql_records::impl_record! {
    Product { id: "id", price: "price" }
}

#[tokio::test]
async fn strict_decode_failure_discards_earlier_rows() {
    let executor = MockExecutor::new();
    executor.expect_query(
        "^SELECT",
        MockRows::new(&["id", "price"])
            .row(vec![RowValues::Int(1), RowValues::Float(10.0)])
            .row(vec![RowValues::Int(2), RowValues::Text("not a price".into())])
            .row(vec![RowValues::Int(3), RowValues::Float(30.0)]),
    );

    let cancel = CancellationToken::new();
    let err = query::<Product, _>(
        &cancel,
        &executor,
        "SELECT * FROM products",
        &[],
        &QueryOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SqlRecordsError::DecodeError(_)));
}

#[tokio::test]
async fn weak_typing_rescues_textual_numbers() -> Result<(), Box<dyn std::error::Error>> {
    let executor = MockExecutor::new();
    executor.expect_query(
        "^SELECT",
        MockRows::new(&["id", "price"])
            .row(vec![RowValues::Text("1".into()), RowValues::Text("45000.98".into())]),
    );

    let cancel = CancellationToken::new();
    let options =
        QueryOptions::default().with_decoder(DecoderConfig::default().with_weak_typing(true));
    let records: Vec<Product> = query(&cancel, &executor, "SELECT * FROM products", &[], &options)
        .await?
        .ok()?;

    assert_eq!(records, vec![Product { id: 1, price: 45000.98 }]);
    Ok(())
}

#[tokio::test]
async fn unmapped_columns_are_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let executor = MockExecutor::new();
    executor.expect_query(
        "^SELECT",
        MockRows::new(&["id", "price", "internal_notes"]).row(vec![
            RowValues::Int(1),
            RowValues::Float(10.0),
            RowValues::Text("ignored".into()),
        ]),
    );

    let cancel = CancellationToken::new();
    let records: Vec<Product> = query(
        &cancel,
        &executor,
        "SELECT * FROM products",
        &[],
        &QueryOptions::default(),
    )
    .await?
    .ok()?;

    assert_eq!(records, vec![Product { id: 1, price: 10.0 }]);
    Ok(())
}

#[tokio::test]
async fn null_values_leave_fields_at_zero() -> Result<(), Box<dyn std::error::Error>> {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct WithOption {
        id: i64,
        note: Option<String>,
    }

    sql_records::impl_record! {
        WithOption { id: "id", note: "note" }
    }

    let executor = MockExecutor::new();
    executor.expect_query(
        "^SELECT",
        MockRows::new(&["id", "note"])
            .row(vec![RowValues::Int(1), RowValues::Null])
            .row(vec![RowValues::Int(2), RowValues::Text("kept".into())]),
    );

    let cancel = CancellationToken::new();
    let records: Vec<WithOption> = query(
        &cancel,
        &executor,
        "SELECT * FROM products",
        &[],
        &QueryOptions::default(),
    )
    .await?
    .ok()?;

    assert_eq!(records[0].note, None);
    assert_eq!(records[1].note, Some("kept".into()));
    Ok(())
}

// A duplicate tag table must fail before the executor sees the statement.
#[derive(Debug, Default)]
struct DupTags {
    first: i64,
    second: i64,
}

impl Record for DupTags {
    fn columns() -> &'static [&'static str] {
        &["id", "id"]
    }

    fn assign(
        &mut self,
        field: usize,
        value: &RowValues,
        config: &DecoderConfig,
    ) -> Result<(), SqlRecordsError> {
        match field {
            0 => self.first = FromRowValue::from_row_value(value, config)?,
            1 => self.second = FromRowValue::from_row_value(value, config)?,
            _ => {}
        }
        Ok(())
    }
}

#[tokio::test]
async fn duplicate_tags_fail_before_any_io() {
    let executor = MockExecutor::new();

    let cancel = CancellationToken::new();
    let err = query::<DupTags, _>(
        &cancel,
        &executor,
        "SELECT * FROM products",
        &[],
        &QueryOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SqlRecordsError::ConfigError(_)));
    assert!(executor.calls().is_empty());
}

// The fast-scan capability binds positionally, ignoring column names.
#[derive(Debug, Default, Clone, PartialEq)]
struct Positional {
    id: i64,
    label: String,
}

impl Positional {
    fn bind_in_order(
        &mut self,
        values: &[RowValues],
        config: &DecoderConfig,
    ) -> Result<(), SqlRecordsError> {
        if let Some(value) = values.first() {
            self.id = FromRowValue::from_row_value(value, config)?;
        }
        if let Some(value) = values.get(1) {
            self.label = FromRowValue::from_row_value(value, config)?;
        }
        Ok(())
    }
}

sql_records::impl_record! {
    Positional { id: "id", label: "label" }
    scan_fast = bind_in_order;
}

#[tokio::test]
async fn fast_scan_bypasses_name_mapping() -> Result<(), Box<dyn std::error::Error>> {
    let executor = MockExecutor::new();
    // Column names deliberately match nothing in the tag table.
    executor.expect_query(
        "^SELECT",
        MockRows::new(&["c0", "c1"])
            .row(vec![RowValues::Int(7), RowValues::Text("seven".into())]),
    );

    let cancel = CancellationToken::new();
    let records: Vec<Positional> = query(
        &cancel,
        &executor,
        "SELECT id, label FROM products",
        &[],
        &QueryOptions::default(),
    )
    .await?
    .ok()?;

    assert_eq!(
        records,
        vec![Positional {
            id: 7,
            label: "seven".into()
        }]
    );
    Ok(())
}

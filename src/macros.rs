/// Implement [`Record`](crate::record::Record) for a struct from a
/// field→column table.
///
/// The optional trailing arms wire the fast-scan and post-unmarshal
/// capabilities to inherent methods of the struct:
///
/// ```rust,ignore
/// sql_records::impl_record! {
///     Store {
///         id: "id",
///         product: "product",
///     }
///     post_unmarshal = localize;
/// }
///
/// impl Store {
///     async fn localize(
///         &mut self,
///         _cancel: sql_records::CancellationToken,
///         _row_index: usize,
///         _total_rows: usize,
///     ) -> Result<(), sql_records::DriverError> {
///         Ok(())
///     }
/// }
/// ```
///
/// A `scan_fast` method has the signature
/// `fn(&mut self, &[RowValues], &DecoderConfig) -> Result<(), SqlRecordsError>`
/// and binds values in result-column order.
#[macro_export]
macro_rules! impl_record {
    (
        $ty:ident {
            $($field:ident : $column:literal),+ $(,)?
        }
        $(scan_fast = $scan:ident;)?
        $(post_unmarshal = $hook:ident;)?
    ) => {
        impl $crate::record::Record for $ty {
            $(const FAST_SCAN: bool = {
                let _ = stringify!($scan);
                true
            };)?

            $(const POST_UNMARSHAL: bool = {
                let _ = stringify!($hook);
                true
            };)?

            fn columns() -> &'static [&'static str] {
                &[$($column),+]
            }

            fn assign(
                &mut self,
                field: usize,
                value: &$crate::types::RowValues,
                config: &$crate::decode::DecoderConfig,
            ) -> Result<(), $crate::error::SqlRecordsError> {
                let mut ordinal = 0usize;
                $(
                    if field == ordinal {
                        self.$field =
                            $crate::decode::FromRowValue::from_row_value(value, config)?;
                        return Ok(());
                    }
                    ordinal += 1;
                )+
                let _ = ordinal;
                Ok(())
            }

            $(
                fn scan_fast(
                    &mut self,
                    values: &[$crate::types::RowValues],
                    config: &$crate::decode::DecoderConfig,
                ) -> Option<Result<(), $crate::error::SqlRecordsError>> {
                    Some(self.$scan(values, config))
                }
            )?

            $(
                fn post_unmarshal(
                    &mut self,
                    cancel: $crate::CancellationToken,
                    row_index: usize,
                    total_rows: usize,
                ) -> Option<$crate::record::HookFuture<'_>> {
                    Some(Box::pin(self.$hook(cancel, row_index, total_rows)))
                }
            )?
        }
    };
}

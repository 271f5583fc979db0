// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::str::FromStr;
use std::sync::Arc;

use itertools::Itertools;
use parse_display::Display;
use tracing::debug;

use super::*;
use crate::storage::{
    Chunk, DictionarySegment, ReferenceSegment, Segment, TableOptions, TracedStorageError,
    ValueId, ValueSegment, INVALID_VALUE_ID,
};
use crate::types::{
    ChunkId, ChunkOffset, ColumnId, DataTypeKind, DataValue, NativeType, PosList, RowId,
    TypeVisitor,
};

/// The comparison a [`TableScanExecutor`] applies to every row.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanType {
    #[display("=")]
    OpEquals,
    #[display("!=")]
    OpNotEquals,
    #[display("<")]
    OpLessThan,
    #[display("<=")]
    OpLessThanEquals,
    #[display(">")]
    OpGreaterThan,
    #[display(">=")]
    OpGreaterThanEquals,
}

impl FromStr for ScanType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "=" => Self::OpEquals,
            "!=" => Self::OpNotEquals,
            "<" => Self::OpLessThan,
            "<=" => Self::OpLessThanEquals,
            ">" => Self::OpGreaterThan,
            ">=" => Self::OpGreaterThanEquals,
            _ => return Err(Error::unsupported_operator(s)),
        })
    }
}

impl ScanType {
    pub const ALL: [ScanType; 6] = [
        Self::OpEquals,
        Self::OpNotEquals,
        Self::OpLessThan,
        Self::OpLessThanEquals,
        Self::OpGreaterThan,
        Self::OpGreaterThanEquals,
    ];

    /// Evaluate `lhs <op> rhs`.
    pub fn compare<T: Ord + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            Self::OpEquals => lhs == rhs,
            Self::OpNotEquals => lhs != rhs,
            Self::OpLessThan => lhs < rhs,
            Self::OpLessThanEquals => lhs <= rhs,
            Self::OpGreaterThan => lhs > rhs,
            Self::OpGreaterThanEquals => lhs >= rhs,
        }
    }
}

/// The scan predicate translated to the codes of one dictionary segment.
///
/// `lower_bound` is the code of the first dictionary entry not smaller than
/// the search value, or `INVALID_VALUE_ID` if there is none. `exists` tells
/// whether that entry equals the search value.
#[derive(Debug, Clone, Copy)]
struct CodePredicate {
    scan_type: ScanType,
    lower_bound: ValueId,
    exists: bool,
}

impl CodePredicate {
    fn new<T: NativeType>(segment: &DictionarySegment<T>, scan_type: ScanType, value: &T) -> Self {
        let lower_bound = segment.lower_bound(value);
        let exists = lower_bound != INVALID_VALUE_ID
            && segment
                .value_by_value_id(lower_bound)
                .is_ok_and(|v| v == value);
        CodePredicate {
            scan_type,
            lower_bound,
            exists,
        }
    }

    fn matches(&self, code: ValueId) -> bool {
        let lb = self.lower_bound;
        match self.scan_type {
            ScanType::OpEquals => self.exists && code == lb,
            ScanType::OpNotEquals => !self.exists || code != lb,
            ScanType::OpLessThan => code < lb,
            ScanType::OpLessThanEquals if self.exists => code <= lb,
            ScanType::OpLessThanEquals => code < lb,
            ScanType::OpGreaterThan if self.exists => code > lb,
            ScanType::OpGreaterThan => code >= lb,
            ScanType::OpGreaterThanEquals => code >= lb,
        }
    }
}

/// Evaluates the predicate on the rows of one data segment.
enum SegmentMatcher<'a, T: NativeType> {
    Value {
        segment: &'a ValueSegment<T>,
        scan_type: ScanType,
        value: &'a T,
    },
    Dictionary {
        segment: &'a DictionarySegment<T>,
        predicate: CodePredicate,
    },
}

impl<'a, T: NativeType> SegmentMatcher<'a, T> {
    fn new(segment: &'a Segment, scan_type: ScanType, value: &'a T) -> Result<Self> {
        match segment {
            Segment::Value(s) => {
                let segment = T::as_value_segment(s).ok_or_else(|| type_mismatch::<T>(s.data_type()))?;
                Ok(Self::Value {
                    segment,
                    scan_type,
                    value,
                })
            }
            Segment::Dictionary(s) => {
                let segment =
                    T::as_dictionary_segment(s).ok_or_else(|| type_mismatch::<T>(s.data_type()))?;
                Ok(Self::Dictionary {
                    segment,
                    predicate: CodePredicate::new(segment, scan_type, value),
                })
            }
            Segment::Reference(_) => Err(TracedStorageError::unsupported_segment(
                "reference segment pointing at another reference segment",
            )
            .into()),
        }
    }

    /// Whether row `offset` satisfies the predicate.
    fn matches(&self, offset: ChunkOffset) -> Result<bool> {
        Ok(match self {
            Self::Value {
                segment,
                scan_type,
                value,
            } => scan_type.compare(segment.get(offset)?, *value),
            Self::Dictionary { segment, predicate } => predicate.matches(segment.value_id(offset)?),
        })
    }

    /// Push the ids of all matching rows of chunk `chunk_id` to `matches`.
    fn collect(&self, chunk_id: ChunkId, matches: &mut PosList) {
        let row_id = |offset: usize| RowId::new(chunk_id, offset as ChunkOffset);
        match self {
            Self::Value {
                segment,
                scan_type,
                value,
            } => matches.extend(
                segment
                    .values()
                    .iter()
                    .positions(|v| scan_type.compare(v, *value))
                    .map(row_id),
            ),
            Self::Dictionary { segment, predicate } => matches.extend(
                segment
                    .attribute_vector()
                    .iter()
                    .positions(|code| predicate.matches(code))
                    .map(row_id),
            ),
        }
    }
}

fn type_mismatch<T: NativeType>(actual: DataTypeKind) -> Error {
    TracedStorageError::unsupported_segment(format!(
        "expected a {} segment, found {actual}",
        T::KIND
    ))
    .into()
}

/// Collects the ids of the matching rows of the base table, instantiated
/// for the native type of the scanned column.
struct CollectMatches<'a> {
    input: &'a Table,
    base: &'a Table,
    column_id: ColumnId,
    scan_type: ScanType,
    search_value: &'a DataValue,
}

impl CollectMatches<'_> {
    fn scan_chunk<T: NativeType>(
        &self,
        chunk_id: ChunkId,
        chunk: &Chunk,
        value: &T,
        matches: &mut PosList,
    ) -> Result<()> {
        match chunk.get_segment(self.column_id)? {
            Segment::Reference(segment) => self.scan_reference(segment, value, matches),
            segment => {
                SegmentMatcher::new(segment, self.scan_type, value)?.collect(chunk_id, matches);
                Ok(())
            }
        }
    }

    /// Evaluate the predicate on the base rows listed by `segment`, looking up
    /// the base segment once per run of rows from the same chunk.
    fn scan_reference<T: NativeType>(
        &self,
        segment: &ReferenceSegment,
        value: &T,
        matches: &mut PosList,
    ) -> Result<()> {
        if !segment.referenced_table().same_table(self.base) {
            return Err(TracedStorageError::unsupported_segment(
                "reference segments of one table must share their base table",
            )
            .into());
        }
        let column_id = segment.referenced_column_id();
        for (chunk_id, rows) in &segment.pos_list().iter().chunk_by(|row_id| row_id.chunk_id) {
            self.base.with_chunk(chunk_id, |chunk| -> Result<()> {
                let matcher =
                    SegmentMatcher::new(chunk.get_segment(column_id)?, self.scan_type, value)?;
                for row_id in rows {
                    if matcher.matches(row_id.chunk_offset)? {
                        matches.push(*row_id);
                    }
                }
                Ok(())
            })??;
        }
        Ok(())
    }
}

impl TypeVisitor for CollectMatches<'_> {
    type Output = Result<PosList>;

    fn visit<T: NativeType>(self) -> Result<PosList> {
        let value: T = self.search_value.cast()?;
        let mut matches = PosList::new();
        for chunk_id in 0..self.input.chunk_count() {
            self.input.with_chunk(chunk_id, |chunk| {
                self.scan_chunk(chunk_id, chunk, &value, &mut matches)
            })??;
        }
        Ok(matches)
    }
}

/// Filter `input` by comparing column `column_id` against `search_value`.
///
/// The result has the schema of the base table and a single chunk of
/// [`ReferenceSegment`]s sharing one position list. If `input` is itself the
/// result of a scan, the result refers to the rows of its base table
/// directly, so chains of scans never nest references.
pub fn scan_table(
    input: &Table,
    column_id: ColumnId,
    scan_type: ScanType,
    search_value: &DataValue,
) -> Result<Table> {
    let base = base_table(input)?;
    let type_tag = input.column_type(column_id)?;
    let matches = input.resolver().resolve(
        &type_tag,
        CollectMatches {
            input,
            base: &base,
            column_id,
            scan_type,
            search_value,
        },
    )??;
    debug!(
        column_id,
        %scan_type,
        %search_value,
        rows = matches.len(),
        "table scan finished"
    );
    Ok(build_output(&base, matches)?)
}

/// The table holding the data: the referenced table if `input` consists of
/// reference segments, `input` itself otherwise.
fn base_table(input: &Table) -> Result<Table> {
    let base = input.with_chunk(0, |chunk| {
        chunk
            .segments()
            .first()
            .and_then(Segment::as_reference)
            .map(|s| s.referenced_table().clone())
    })?;
    Ok(base.unwrap_or_else(|| input.clone()))
}

fn build_output(base: &Table, matches: PosList) -> crate::storage::StorageResult<Table> {
    let output = Table::with_resolver(
        TableOptions::with_chunk_size(base.target_chunk_size()),
        base.resolver().clone(),
    );
    for (name, type_tag) in base.column_names().into_iter().zip(base.column_types()) {
        output.add_column_definition(name, type_tag)?;
    }
    let pos_list = Arc::new(matches);
    let chunk: Chunk = (0..base.column_count() as ColumnId)
        .map(|column_id| {
            Segment::Reference(ReferenceSegment::new(base.clone(), column_id, pos_list.clone()))
        })
        .collect();
    output.emplace_chunk(chunk)?;
    Ok(output)
}

/// Filters the output of its child.
pub struct TableScanExecutor {
    child: BoxedExecutor,
    column_id: ColumnId,
    scan_type: ScanType,
    search_value: DataValue,
}

impl TableScanExecutor {
    pub fn new(
        child: BoxedExecutor,
        column_id: ColumnId,
        scan_type: ScanType,
        search_value: impl Into<DataValue>,
    ) -> Self {
        TableScanExecutor {
            child,
            column_id,
            scan_type,
            search_value: search_value.into(),
        }
    }

    pub fn column_id(&self) -> ColumnId {
        self.column_id
    }

    pub fn scan_type(&self) -> ScanType {
        self.scan_type
    }

    pub fn search_value(&self) -> &DataValue {
        &self.search_value
    }
}

impl Executor for TableScanExecutor {
    fn execute(&self) -> Result<Table> {
        let input = self.child.execute()?;
        scan_table(&input, self.column_id, self.scan_type, &self.search_value)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use test_case::test_case;

    use super::*;
    use crate::storage::StorageError;

    fn wrap(table: &Table) -> BoxedExecutor {
        Box::new(TableWrapperExecutor::new(table.clone()))
    }

    fn scan(table: &Table, column_id: ColumnId, op: &str, value: impl Into<DataValue>) -> Table {
        TableScanExecutor::new(wrap(table), column_id, op.parse().unwrap(), value)
            .execute()
            .unwrap()
    }

    /// Values of column `column_id` of all rows, in order.
    fn column_values(table: &Table, column_id: ColumnId) -> Vec<DataValue> {
        let mut values = vec![];
        for chunk_id in 0..table.chunk_count() {
            let chunk = table.get_chunk(chunk_id).unwrap();
            let segment = chunk.get_segment(column_id).unwrap();
            for offset in 0..segment.len() {
                values.push(segment.get(offset as ChunkOffset).unwrap());
            }
        }
        values
    }

    fn pos_list(table: &Table) -> Vec<RowId> {
        let chunk = table.get_chunk(0).unwrap();
        let segment = chunk.segments()[0].as_reference().unwrap();
        segment.pos_list().to_vec()
    }

    fn names_table() -> Table {
        let table = Table::new(10);
        table.add_column("name", "string").unwrap();
        for name in ["Bill", "Steve", "Alexander", "Steve", "Hasso", "Bill"] {
            table.append(&[DataValue::from(name)]).unwrap();
        }
        table
    }

    /// 13 rows of (int, float) in chunks of 5.
    fn numbers_table() -> Table {
        let table = Table::new(5);
        table.add_column("a", "int").unwrap();
        table.add_column("b", "float").unwrap();
        for i in 0..13 {
            table
                .append(&[DataValue::from(i % 7 * 2), DataValue::from(i as f32 + 0.5)])
                .unwrap();
        }
        table
    }

    #[test_case("=", ScanType::OpEquals; "equals")]
    #[test_case("!=", ScanType::OpNotEquals; "not equals")]
    #[test_case("<", ScanType::OpLessThan; "less than")]
    #[test_case("<=", ScanType::OpLessThanEquals; "less equals")]
    #[test_case(">", ScanType::OpGreaterThan; "greater than")]
    #[test_case(">=", ScanType::OpGreaterThanEquals; "greater equals")]
    fn test_parse_scan_type(op: &str, scan_type: ScanType) {
        assert_eq!(op.parse::<ScanType>().unwrap(), scan_type);
        assert_eq!(scan_type.to_string(), op);
    }

    #[test_case("=="; "double equals")]
    #[test_case("<>"; "sql not equals")]
    #[test_case(""; "empty")]
    fn test_parse_unsupported_operator(op: &str) {
        let err = op.parse::<ScanType>().unwrap_err();
        assert!(err.is_unsupported_operator());
    }

    #[test]
    fn test_scan_names() {
        for compress in [false, true] {
            let table = names_table();
            if compress {
                table.compress_chunk(0).unwrap();
            }
            let offsets = |t: &Table| pos_list(t).iter().map(|r| r.chunk_offset).collect_vec();

            assert_eq!(offsets(&scan(&table, 0, "=", "Steve")), vec![1, 3]);
            assert_eq!(offsets(&scan(&table, 0, "<", "Hasso")), vec![0, 2, 5]);
            assert!(offsets(&scan(&table, 0, "=", "Aaron")).is_empty());
            assert_eq!(offsets(&scan(&table, 0, ">=", "Aaron")), vec![0, 1, 2, 3, 4, 5]);
        }
    }

    #[test_case("=", 4 => vec![2, 9]; "equals")]
    #[test_case("=", 5 => Vec::<i32>::new(); "equals absent")]
    #[test_case("!=", 4 => vec![0, 1, 3, 4, 5, 6, 7, 8, 10, 11, 12]; "not equals")]
    #[test_case("!=", 5 => (0..13).collect::<Vec<i32>>(); "not equals absent")]
    #[test_case("<", 4 => vec![0, 1, 7, 8]; "less than")]
    #[test_case("<", 5 => vec![0, 1, 2, 7, 8, 9]; "less than absent")]
    #[test_case("<=", 4 => vec![0, 1, 2, 7, 8, 9]; "less equals")]
    #[test_case("<=", 5 => vec![0, 1, 2, 7, 8, 9]; "less equals absent")]
    #[test_case(">", 10 => vec![6]; "greater than")]
    #[test_case(">", 11 => vec![6]; "greater than absent")]
    #[test_case(">=", 12 => vec![6]; "greater equals")]
    #[test_case(">=", 13 => Vec::<i32>::new(); "greater equals above all")]
    #[test_case("<", 13 => (0..13).collect::<Vec<i32>>(); "less than above all")]
    #[test_case(">", -1 => (0..13).collect::<Vec<i32>>(); "greater than below all")]
    fn test_scan_operators(op: &str, value: i32) -> Vec<i32> {
        let plain = numbers_table();
        let compressed = numbers_table();
        for chunk_id in 0..compressed.chunk_count() {
            compressed.compress_chunk(chunk_id).unwrap();
        }

        let rows = |table: &Table| {
            let result = scan(table, 0, op, value);
            pos_list(&result)
                .iter()
                .map(|r| (r.chunk_id * 5 + r.chunk_offset) as i32)
                .collect_vec()
        };
        let expected = rows(&plain);
        assert_eq!(rows(&compressed), expected);
        expected
    }

    #[test]
    fn test_scan_mixed_chunks() {
        let table = numbers_table();
        table.compress_chunk(1).unwrap();
        let result = scan(&table, 1, ">", 7.0f32);
        assert_eq!(
            pos_list(&result),
            vec![
                RowId::new(1, 2),
                RowId::new(1, 3),
                RowId::new(1, 4),
                RowId::new(2, 0),
                RowId::new(2, 1),
                RowId::new(2, 2),
            ]
        );
        assert_eq!(result.row_count(), 6);
        assert_eq!(result.chunk_count(), 1);
    }

    #[test]
    fn test_output_schema() {
        let table = numbers_table();
        let result = scan(&table, 0, "<", 4);
        assert_eq!(result.column_names(), vec!["a", "b"]);
        assert_eq!(result.column_types(), vec!["int", "float"]);

        let chunk = result.get_chunk(0).unwrap();
        let segments = chunk
            .segments()
            .iter()
            .map(|s| s.as_reference().unwrap())
            .collect_vec();
        assert_eq!(segments.len(), 2);
        assert!(Arc::ptr_eq(segments[0].pos_list(), segments[1].pos_list()));
        assert!(segments[0].referenced_table().same_table(&table));
        assert_eq!(segments[1].referenced_column_id(), 1);

        assert_eq!(
            column_values(&result, 1),
            [0.5f32, 1.5, 7.5, 8.5].map(DataValue::from).to_vec()
        );
    }

    #[test]
    fn test_empty_result() {
        let table = numbers_table();
        let result = scan(&table, 0, ">", 100);
        assert_eq!(result.row_count(), 0);
        assert_eq!(result.column_count(), 2);
        assert_eq!(result.chunk_count(), 1);

        let again = scan(&result, 1, "<", 100.0f32);
        assert_eq!(again.row_count(), 0);
    }

    #[test]
    fn test_chained_scans() {
        let table = numbers_table();
        table.compress_chunk(0).unwrap();

        let first = scan(&table, 0, ">=", 4);
        let second = scan(&first, 1, "<", 10.0f32);

        let chunk = second.get_chunk(0).unwrap();
        let segment = chunk.get_segment(0).unwrap().as_reference().unwrap();
        assert!(segment.referenced_table().same_table(&table));
        assert_eq!(
            segment.pos_list().as_slice(),
            &[
                RowId::new(0, 2),
                RowId::new(0, 3),
                RowId::new(0, 4),
                RowId::new(1, 0),
                RowId::new(1, 1),
                RowId::new(1, 4),
            ]
        );
        assert_eq!(
            column_values(&second, 0),
            [4, 6, 8, 10, 12, 4].map(DataValue::from).to_vec()
        );
    }

    #[test]
    fn test_compress_after_scan() {
        let table = numbers_table();
        let result = scan(&table, 0, "!=", 0);
        let before = (column_values(&result, 0), column_values(&result, 1));

        for chunk_id in 0..table.chunk_count() {
            table.compress_chunk(chunk_id).unwrap();
        }
        let after = (column_values(&result, 0), column_values(&result, 1));
        assert_eq!(before, after);

        let again = scan(&result, 0, "=", 2);
        assert_eq!(column_values(&again, 0), vec![DataValue::from(2); 2]);
    }

    #[test]
    fn test_search_value_is_cast() {
        let table = Table::new(4);
        table.add_column("l", "long").unwrap();
        table.add_column("d", "double").unwrap();
        for i in 0..6 {
            table
                .append(&[DataValue::from(i as i64), DataValue::from(i as f64)])
                .unwrap();
        }
        // an int search value widens to long and double
        assert_eq!(scan(&table, 0, "<", 2).row_count(), 2);
        assert_eq!(scan(&table, 1, ">=", 2).row_count(), 4);

        let err = TableScanExecutor::new(wrap(&table), 0, ScanType::OpEquals, "2")
            .execute()
            .unwrap_err();
        assert!(err.as_convert().is_some());
    }

    #[test]
    fn test_column_out_of_range() {
        let table = numbers_table();
        let err = TableScanExecutor::new(wrap(&table), 2, ScanType::OpEquals, 1)
            .execute()
            .unwrap_err();
        assert!(matches!(
            err.as_storage(),
            Some(StorageError::OutOfRange { kind: "column", .. })
        ));
    }

    #[test]
    fn test_predicate_equivalence() {
        let mut rng = StdRng::seed_from_u64(42);
        let table = Table::new(16);
        table.add_column("v", "long").unwrap();
        let mut values = vec![];
        for _ in 0..100 {
            let v: i64 = rng.gen_range(0..40);
            values.push(v);
            table.append(&[DataValue::from(v)]).unwrap();
        }
        for chunk_id in (0..table.chunk_count()).step_by(2) {
            table.compress_chunk(chunk_id).unwrap();
        }
        let filtered = scan(&table, 0, ">=", 10);

        for _ in 0..50 {
            let search: i64 = rng.gen_range(-5..45);
            let scan_type = ScanType::ALL[rng.gen_range(0..6)];

            let expected = values
                .iter()
                .filter(|v| scan_type.compare(*v, &search))
                .map(|&v| DataValue::from(v))
                .collect_vec();
            let result = scan_table(&table, 0, scan_type, &DataValue::from(search)).unwrap();
            assert_eq!(column_values(&result, 0), expected, "{scan_type} {search}");

            let expected = values
                .iter()
                .filter(|&&v| v >= 10 && scan_type.compare(&v, &search))
                .map(|&v| DataValue::from(v))
                .collect_vec();
            let result = scan_table(&filtered, 0, scan_type, &DataValue::from(search)).unwrap();
            assert_eq!(column_values(&result, 0), expected, "{scan_type} {search}");
        }
    }
}

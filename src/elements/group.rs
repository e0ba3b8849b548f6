use crate::error::{Error, Result};

/// Per-table tuple of per-column values; `None` means "pick a default when
/// drawing".
pub type Group<T> = Vec<Vec<Option<T>>>;

/// Lengths a user-supplied list may have for a given table × column shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly `ncol`.
    Columns,
    /// `ntab`, or a single value shared by all tables.
    TablesOrOne,
    /// `ncol` (shared by all tables) or `ntab * ncol`.
    ColumnsOrCells,
    /// Exactly `ntab`.
    Tables,
}

/// Check the length of an optional user list before anything is grouped.
///
/// `noun` is the plural used in the message ("labels", "markers", ...).
pub fn check_count(noun: &str, given: Option<usize>, rule: Cardinality, ntab: usize, ncol: usize) -> Result<()> {
    let Some(n) = given else {
        return Ok(());
    };
    let (ok, msg) = match rule {
        Cardinality::Columns => (
            n == ncol,
            format!("number of {noun} ({n}) should match number of y-columns ({ncol})"),
        ),
        Cardinality::TablesOrOne => (
            n == ntab || n == 1,
            format!("number of {noun} ({n}) should either match number of tables ({ntab}) or be 1"),
        ),
        Cardinality::ColumnsOrCells => (
            n == ncol || n == ntab * ncol,
            format!(
                "number of {noun} ({n}) should match number of tables x Y-columns ({}) or the number of Y-columns ({ncol})",
                ntab * ncol
            ),
        ),
        Cardinality::Tables => (
            n == ntab,
            format!("number of {noun} ({n}) should match number of tables ({ntab})"),
        ),
    };
    if ok {
        Ok(())
    } else {
        Err(Error::cardinality(msg))
    }
}

/// Arrange a flat list into `ntab` groups of `ncol` values.
///
/// * `None` gives `ntab` groups of `ncol` `None`s.
/// * `ntab * ncol` values are chunked table by table, in order.
/// * `ncol` values form one group that is repeated for every table (this
///   also covers a single value shared by all tables when `ncol == 1`).
pub fn grouped<T: Clone>(flat: Option<Vec<Option<T>>>, ntab: usize, ncol: usize) -> Result<Group<T>> {
    let Some(flat) = flat else {
        return Ok(vec![vec![None; ncol]; ntab]);
    };
    if ncol == 0 {
        return Err(Error::cardinality("at least one Y column is needed"));
    }
    if flat.len() == ntab * ncol {
        Ok(flat.chunks(ncol).map(<[Option<T>]>::to_vec).collect())
    } else if flat.len() == ncol {
        Ok(vec![flat; ntab])
    } else {
        Err(Error::cardinality(format!(
            "cannot arrange {} values into {ntab} tables of {ncol} columns",
            flat.len()
        )))
    }
}

/// Wrap every value of an optional user list in `Some`.
pub fn some_all<T: Clone>(values: Option<&[T]>) -> Option<Vec<Option<T>>> {
    values.map(|v| v.iter().cloned().map(Some).collect())
}

/// Abbreviated column name for legends: first `length` characters plus a dot.
pub fn truncated(name: &str, length: usize) -> String {
    let mut short: String = name.chars().take(length).collect();
    short.push('.');
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_gives_all_none() {
        for ntab in 1..4 {
            for ncol in 1..4 {
                let g: Group<String> = grouped(None, ntab, ncol).unwrap();
                assert_eq!(g.len(), ntab);
                assert!(g.iter().all(|row| row.len() == ncol && row.iter().all(Option::is_none)));
            }
        }
    }

    #[test]
    fn ncol_values_are_replicated() {
        let g = grouped(Some(vec![Some("a"), Some("b")]), 3, 2).unwrap();
        assert_eq!(g, vec![vec![Some("a"), Some("b")]; 3]);
    }

    #[test]
    fn cells_are_chunked_table_major() {
        let flat: Vec<Option<u8>> = (1..=6).map(Some).collect();
        let g = grouped(Some(flat), 3, 2).unwrap();
        assert_eq!(
            g,
            vec![
                vec![Some(1), Some(2)],
                vec![Some(3), Some(4)],
                vec![Some(5), Some(6)]
            ]
        );
    }

    #[test]
    fn single_value_shared_when_one_column() {
        let g = grouped(Some(vec![Some('+')]), 3, 1).unwrap();
        assert_eq!(g, vec![vec![Some('+')]; 3]);
    }

    #[test]
    fn other_lengths_fail() {
        assert!(grouped(Some(vec![Some(1), Some(2), Some(3)]), 3, 2).is_err());
    }

    #[test]
    fn check_messages() {
        let err = check_count("legends", Some(2), Cardinality::TablesOrOne, 3, 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "number of legends (2) should either match number of tables (3) or be 1"
        );
        let err = check_count("legends", Some(3), Cardinality::ColumnsOrCells, 3, 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "number of legends (3) should match number of tables x Y-columns (6) or the number of Y-columns (2)"
        );
        assert!(check_count("markers", None, Cardinality::Tables, 3, 2).is_ok());
        assert!(check_count("titles", Some(3), Cardinality::Tables, 3, 2).is_ok());
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncated("Electrical Current", 6), "Electr.");
        assert_eq!(truncated("Ångström", 3), "Ång.");
        assert_eq!(truncated("Y", 6), "Y.");
    }
}

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::TransactionTable;

/// The number of categories in each ranking
pub const TOP_N: usize = 3;

/// A category and the number of its transactions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// A category and the summed amount of its transactions
#[derive(Clone, Debug, PartialEq)]
pub struct CategorySum {
    pub category: String,
    pub sum: f64,
}

/// Summary metrics of a cleaned transaction table
#[derive(Clone, Debug, PartialEq)]
pub struct Metrics {
    /// The sum of all amounts, `0` for an empty table
    pub total: f64,
    /// The mean of all amounts, undefined for an empty table
    pub average: Option<f64>,
    /// The categories with the most transactions, most frequent first
    ///
    /// Categories with the same count keep the order in which they first
    /// appear in the table.
    pub top_count: Vec<CategoryCount>,
    /// The categories with the smallest summed amount, i.e. the largest
    /// expenses, smallest sum first
    ///
    /// Categories with the same sum are ordered by name.
    pub top_spend: Vec<CategorySum>,
}

/// Computes the [`Metrics`] of a cleaned transaction table
///
/// Transactions without a category are part of the total and the average, but
/// of neither ranking.
pub fn analyze(table: &TransactionTable) -> Metrics {
    let total = table.amounts().fold(0.0, |total, amount| total + amount);
    let average = match table.len() {
        0 => None,
        len => Some(total / len as f64),
    };

    Metrics {
        total,
        average,
        top_count: top_by_count(table),
        top_spend: top_by_spend(table),
    }
}

fn top_by_count(table: &TransactionTable) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for category in table.categories().flatten() {
        match index.get(&*category) {
            Some(&position) => counts[position].count += 1,
            None => {
                index.insert(category.to_string(), counts.len());
                counts.push(CategoryCount {
                    category: category.into_owned(),
                    count: 1,
                });
            }
        }
    }

    // stable, ties stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_N);
    counts
}

fn top_by_spend(table: &TransactionTable) -> Vec<CategorySum> {
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();

    for (category, amount) in table.categories().zip(table.amounts()) {
        if let Some(category) = category {
            *sums.entry(category.into_owned()).or_insert(0.0) += amount;
        }
    }

    let mut sums: Vec<CategorySum> = sums
        .into_iter()
        .map(|(category, sum)| CategorySum { category, sum })
        .collect();
    // stable, ties stay in name order
    sums.sort_by(|a, b| a.sum.total_cmp(&b.sum));
    sums.truncate(TOP_N);
    sums
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Finanzanalyse:")?;
        writeln!(f, "Gesamtsumme aller Beträge: {:.2} €", self.total)?;
        match self.average {
            Some(average) => writeln!(f, "Durchschnittlicher Betrag: {:.2} €", average)?,
            None => writeln!(f, "Durchschnittlicher Betrag: n/a")?,
        }

        writeln!(f)?;
        writeln!(f, "Top {} Kategorien (nach Anzahl Buchungen):", TOP_N)?;
        let width = self.top_count.iter().map(|c| c.category.chars().count()).max().unwrap_or(0);
        for CategoryCount { category, count } in &self.top_count {
            writeln!(f, "  {:<width$}  {:>5}", category, count, width = width)?;
        }

        writeln!(f)?;
        writeln!(f, "Top {} Ausgabenkategorien (nach Summe, stärkste negative Beträge):", TOP_N)?;
        let width = self.top_spend.iter().map(|c| c.category.chars().count()).max().unwrap_or(0);
        for CategorySum { category, sum } in &self.top_spend {
            writeln!(f, "  {:<width$}  {:>12.2} €", category, sum, width = width)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clean, loader, LoadOptions};

    fn metrics(csv: &str) -> Metrics {
        let table = loader::read(csv.as_bytes(), &LoadOptions::default()).unwrap();
        analyze(&clean(table).unwrap())
    }

    macro_rules! analyzer_test {
        (
            $name:ident
            $transactions:literal
            total: $total:expr,
            average: $average:expr,
            top_count: [$(($count_category:literal, $count:literal)),*],
            top_spend: [$(($spend_category:literal, $sum:literal)),*]
        ) => {
            #[test]
            fn $name() {
                let metrics = metrics($transactions);

                assert!((metrics.total - $total).abs() < 1e-9, "total was {}", metrics.total);
                let average: Option<f64> = $average;
                match (metrics.average, average) {
                    (Some(actual), Some(expected)) => assert!((actual - expected).abs() < 1e-9),
                    (actual, expected) => assert_eq!(actual, expected),
                }
                let top_count: Vec<CategoryCount> = vec![
                    $(CategoryCount { category: $count_category.to_owned(), count: $count }),*
                ];
                let top_spend: Vec<CategorySum> = vec![
                    $(CategorySum { category: $spend_category.to_owned(), sum: $sum }),*
                ];
                assert_eq!(metrics.top_count, top_count);
                assert_eq!(metrics.top_spend, top_spend);
            }
        };
    }

    analyzer_test!(single_transaction
        "Datum,Empfänger,Betrag,Kategorie
2024-01-01,A,-32.5,Food"
        total: -32.5,
        average: Some(-32.5),
        top_count: [("Food", 1)],
        top_spend: [("Food", -32.5)]
    );

    analyzer_test!(unparseable_date_is_excluded
        "Datum,Empfänger,Betrag,Kategorie
2024-01-01,A,-10,Food
letzte Woche,B,-1000,Rent
2024-01-03,C,-20,Food"
        total: -30.0,
        average: Some(-15.0),
        top_count: [("Food", 2)],
        top_spend: [("Food", -30.0)]
    );

    analyzer_test!(most_frequent_category_first
        "Datum,Empfänger,Betrag,Kategorie
2024-01-01,A,-1000,Rent
2024-01-02,B,-10,Food
2024-01-03,C,-10,Food
2024-01-04,D,-10,Food
2024-01-05,E,-10,Food"
        total: -1040.0,
        average: Some(-208.0),
        top_count: [("Food", 4), ("Rent", 1)],
        top_spend: [("Rent", -1000.0), ("Food", -40.0)]
    );

    analyzer_test!(largest_expenses_ascending
        "Datum,Empfänger,Betrag,Kategorie
2024-01-01,Arbeitgeber,2000,Salary
2024-01-02,Supermarkt,-50,Food
2024-01-03,Vermieter,-1000,Rent"
        total: 950.0,
        average: Some(950.0 / 3.0),
        top_count: [("Salary", 1), ("Food", 1), ("Rent", 1)],
        top_spend: [("Rent", -1000.0), ("Food", -50.0), ("Salary", 2000.0)]
    );

    analyzer_test!(rankings_are_limited
        "Datum,Empfänger,Betrag,Kategorie
2024-01-01,A,-1,A
2024-01-02,B,-2,B
2024-01-03,C,-3,C
2024-01-04,D,-4,D
2024-01-05,E,-5,B"
        total: -15.0,
        average: Some(-3.0),
        top_count: [("B", 2), ("A", 1), ("C", 1)],
        top_spend: [("B", -7.0), ("D", -4.0), ("C", -3.0)]
    );

    analyzer_test!(count_ties_keep_first_seen_order
        "Datum,Empfänger,Betrag,Kategorie
2024-01-01,A,-1,Zoo
2024-01-02,B,-1,Bar
2024-01-03,C,-1,Apotheke
2024-01-04,D,-1,Bar
2024-01-05,E,-1,Zoo"
        total: -5.0,
        average: Some(-1.0),
        top_count: [("Zoo", 2), ("Bar", 2), ("Apotheke", 1)],
        top_spend: [("Bar", -2.0), ("Zoo", -2.0), ("Apotheke", -1.0)]
    );

    analyzer_test!(missing_categories_only_count_towards_total
        "Datum,Empfänger,Betrag,Kategorie
2024-01-01,A,-100,
2024-01-02,B,-10,Food"
        total: -110.0,
        average: Some(-55.0),
        top_count: [("Food", 1)],
        top_spend: [("Food", -10.0)]
    );

    analyzer_test!(empty_after_cleaning
        "Datum,Empfänger,Betrag,Kategorie
kaputt,A,-100,Food"
        total: 0.0,
        average: None,
        top_count: [],
        top_spend: []
    );

    #[test]
    fn report() {
        let metrics = Metrics {
            total: -1040.0,
            average: Some(-208.0),
            top_count: vec![
                CategoryCount { category: "Food".into(), count: 4 },
                CategoryCount { category: "Rent".into(), count: 1 },
            ],
            top_spend: vec![CategorySum { category: "Rent".into(), sum: -1000.0 }],
        };

        let report = metrics.to_string();

        assert!(report.contains("Gesamtsumme aller Beträge: -1040.00 €"));
        assert!(report.contains("Durchschnittlicher Betrag: -208.00 €"));
        assert!(report.contains("  Food      4\n  Rent      1\n"));
        assert!(report.contains("  Rent      -1000.00 €\n"));
        assert!(report.ends_with("€\n"));
        assert!(!report.ends_with("\n\n"));
    }

    #[test]
    fn report_without_transactions() {
        let metrics = Metrics {
            total: 0.0,
            average: None,
            top_count: Vec::new(),
            top_spend: Vec::new(),
        };

        let report = metrics.to_string();

        assert!(report.contains("Gesamtsumme aller Beträge: 0.00 €"));
        assert!(report.contains("Durchschnittlicher Betrag: n/a"));
    }
}

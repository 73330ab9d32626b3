/// The fields every transaction record has to provide
///
/// The header names are the German column names of the bank export and are
/// part of the input format. They cannot be renamed without breaking existing
/// files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// The booking date of the transaction
    Date,
    /// The counterparty of the transaction
    Recipient,
    /// The signed amount in currency units, negative for expenses
    Amount,
    /// A free-text label used to group transactions
    Category,
}

impl Field {
    /// All required fields, in the column order of the export
    pub const ALL: [Field; 4] = [Field::Date, Field::Recipient, Field::Amount, Field::Category];

    /// The column header of the field in a transaction file
    pub fn header(self) -> &'static str {
        match self {
            Field::Date => "Datum",
            Field::Recipient => "Empfänger",
            Field::Amount => "Betrag",
            Field::Category => "Kategorie",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

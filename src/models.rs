use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Payment method codes understood by HomeBank's CSV import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentMethod {
    #[default]
    Regular,
    CreditCard,
}

impl PaymentMethod {
    pub fn code(&self) -> u8 {
        match self {
            Self::Regular => 0,
            Self::CreditCard => 1,
        }
    }
}

/// One row of the HomeBank transaction import CSV.
///
/// See "Transaction import CSV format" at <http://homebank.free.fr/help/misc-csvformat.html>.
/// Every parser converts its own records into this shape before writing.
#[derive(Debug, Clone, PartialEq)]
pub struct HomebankRecord {
    pub date: NaiveDate,
    pub payment: PaymentMethod,
    pub info: String,
    pub payee: String,
    pub memo: String,
    pub amount: Decimal,
    pub category: String,
    pub tags: String,
}

impl HomebankRecord {
    /// A record with only date and amount set; everything else empty.
    pub fn new(date: NaiveDate, amount: Decimal) -> Self {
        Self {
            date,
            payment: PaymentMethod::default(),
            info: String::new(),
            payee: String::new(),
            memo: String::new(),
            amount,
            category: String::new(),
            tags: String::new(),
        }
    }
}

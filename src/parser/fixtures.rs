//! Small sample exports for tests.

use std::path::{Path, PathBuf};

pub const MONEYWALLET: &str = "\
wallet,currency,category,datetime,money,description
Cash,EUR,Food,2023-10-01 12:34:56,-12.50,Lunch
Cash,EUR,Salary,2023-10-02 08:00:00,1500.00,October salary
";

pub const VOLKSBANK_HEADER: &str = "Bezeichnung Auftragskonto;IBAN Auftragskonto;BIC Auftragskonto;Bankname Auftragskonto;Buchungstag;Valutadatum;Name Zahlungsbeteiligter;IBAN Zahlungsbeteiligter;BIC (SWIFT-Code) Zahlungsbeteiligter;Buchungstext;Verwendungszweck;Betrag;Waehrung;Saldo nach Buchung;Bemerkung;Gekennzeichneter Umsatz;Glaeubiger ID;Mandatsreferenz";

pub fn volksbank() -> String {
    format!(
        "{VOLKSBANK_HEADER}\n\
         Girokonto;DE12345678901234567890;GENODEF1XXX;Volksbank;04.10.2023;04.10.2023;Hausverwaltung Meier;DE98765432109876543210;GENODEF1YYY;Dauerauftrag;Miete Oktober;-750,00;EUR;1.234,56;;;;\n\
         Girokonto;DE12345678901234567890;GENODEF1XXX;Volksbank;05.10.2023;05.10.2023;Arbeitgeber GmbH;DE11111111111111111111;GENODEF1ZZZ;Gehalt;Gehalt Oktober;2.500,00;EUR;3.734,56;;;;\n"
    )
}

pub const COMDIRECT: &str = "\
;
\"Umsätze Girokonto\";\"Zeitraum: 30 Tage\";
\"Neuer Kontostand\";\"1.234,56 EUR\";

\"Buchungstag\";\"Wertstellung (Valuta)\";\"Vorgang\";\"Buchungstext\";\"Umsatz in EUR\";
\"offen\";\"--\";\"Kartenverfügung\";\"Buchungstext: BAECKEREI Ref. 1\";\"-5,00\";
\"05.10.2023\";\"05.10.2023\";\"Lastschrift / Belastung\";\"Auftraggeber: Stadtwerke Buchungstext: Strom Abschlag 10/2023 Ref. 123\";\"-45,00\";
\"04.10.2023\";\"04.10.2023\";\"Kartenverfügung\";\"Buchungstext: REWE SAGT DANKE 1234 Ref. 456\";\"-23,45\";
\"02.10.2023\";\"02.10.2023\";\"Übertrag / Überweisung\";\"Auftraggeber: Firma GmbH Buchungstext: Gehalt Oktober Kto/IBAN: DE123 BLZ/BIC: ABC123\";\"2.500,00\";

\"Alter Kontostand\";\"1.000,00 EUR\";
";

pub const DKB_HEADER: &str = "\"Buchungsdatum\";\"Wertstellung\";\"Status\";\"Zahlungspflichtige*r\";\"Zahlungspflichtige*r\";\"Verwendungszweck\";\"Umsatztyp\";\"IBAN\";\"Betrag (€)\";\"Gläubiger-ID\";\"Mandatsreferenz\";\"Kundenreferenz\"";

pub fn dkb() -> String {
    format!(
        "\u{feff}\"Girokonto\";\"DE12345678901234567890\"\n\
         \"\"\n\
         \"Kontostand vom 13.12.2024:\";\"1.234,56 €\"\n\
         \"\"\n\
         {DKB_HEADER}\n\
         \"13.12.24\";\"13.12.24\";\"Gebucht\";\"Max Mustermann\";\"Stromanbieter AG\";\"Abschlag Dezember\";\"Ausgang\";\"DE02100100109307118603\";\"-85,00\";\"DE98ZZZ09999999999\";\"M-123\";\"K-456\"\n\
         \"12.12.24\";\"12.12.24\";\"Gebucht\";\"Arbeitgeber GmbH\";\"Max Mustermann\";\"Gehalt\";\"Eingang\";\"DE02100100109307118604\";\"2.750,00\";\"\";\"\";\"\"\n\
         \"11.12.24\";\"11.12.24\";\"Gebucht\";\"DKB AG\";\"DKB AG\";\"Abrechnung\";\"Eingang\";\"\";\"0\";\"\";\"\";\"\"\n\
         \"10.12.24\";\"10.12.24\";\"Vorgemerkt\";\"Max Mustermann\";\"Café\";\"Kaffee\";\"Ausgang\";\"\";\"-3,50\";\"\";\"\";\"\"\n"
    )
}

/// Encode `text` as ISO-8859-1. Every char must be below U+0100.
pub fn latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u32 as u8).collect()
}

pub fn write(dir: &Path, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn write_moneywallet(dir: &Path, name: &str) -> PathBuf {
    write(dir, name, MONEYWALLET)
}

pub fn write_volksbank(dir: &Path, name: &str) -> PathBuf {
    write(dir, name, volksbank())
}

pub fn write_comdirect(dir: &Path, name: &str) -> PathBuf {
    write(dir, name, latin1(COMDIRECT))
}

pub fn write_dkb(dir: &Path, name: &str) -> PathBuf {
    write(dir, name, dkb())
}

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Workbook with a three row preamble, the header on row 4, two booked
/// transactions and one pending transaction.
pub fn barclaycard_xlsx() -> PathBuf {
    fixture_path("barclaycard.xlsx")
}

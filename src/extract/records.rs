use super::fields::{StatementDate, parse_card_header, split_inline_row};
use super::lines::{Line, Lines};
use crate::markup::Node;
use crate::types::PurchaseRecord;

/// Fields gathered for one candidate purchase row, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub fields: Vec<String>,
    pub card_suffix: Option<String>,
}

/// Lazy, single-pass extraction of purchase records from a markup tree.
///
/// Card section headers ("Card ••1234", "•••• 1234") set the card suffix for
/// every row that follows until the next header. A row starts at a line whose
/// first field is a statement date and is complete once it holds date,
/// description and amount. A table row brings all its fields at once, as does
/// a row printed on one line ("01 JAN Uber 12,50"); the `pdftohtml` layout
/// brings one field per line, and a card header may sit between the date and
/// the description.
///
/// Rows that cannot be decomposed are dropped and counted, never emitted.
pub struct Records<'a> {
    lines: Lines<'a>,
    card_suffix: Option<String>,
    pending: Vec<String>,
    emitted: usize,
    dropped: usize,
    warned_unsectioned: bool,
}

impl<'a> Records<'a> {
    pub fn new(root: &'a Node) -> Self {
        Records {
            lines: Lines::new(root),
            card_suffix: None,
            pending: Vec::new(),
            emitted: 0,
            dropped: 0,
            warned_unsectioned: false,
        }
    }

    /// Records yielded so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Candidate rows dropped so far as malformed.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn drop_pending(&mut self, reason: &str) {
        if self.pending.is_empty() {
            return;
        }
        let fields = std::mem::take(&mut self.pending);
        tracing::debug!(?fields, reason, "dropping incomplete row");
        self.dropped += 1;
    }

    fn complete(&mut self, fields: Vec<String>) -> Option<PurchaseRecord> {
        let row = RawRow {
            fields,
            card_suffix: self.card_suffix.clone(),
        };

        match PurchaseRecord::try_from(&row) {
            Ok(record) => {
                if record.card_suffix.is_none() && !self.warned_unsectioned {
                    tracing::warn!("purchase found before any card section header; card suffix left empty");
                    self.warned_unsectioned = true;
                }
                self.emitted += 1;
                Some(record)
            }
            Err(err) => {
                tracing::debug!(fields = ?row.fields, error = %err, "dropping malformed row");
                self.dropped += 1;
                None
            }
        }
    }

    fn starts_row(line: &Line) -> bool {
        line.fields()
            .first()
            .is_some_and(|field| field.parse::<StatementDate>().is_ok())
    }
}

impl Iterator for Records<'_> {
    type Item = PurchaseRecord;

    fn next(&mut self) -> Option<PurchaseRecord> {
        while let Some(line) = self.lines.next() {
            if let Some(card) = line.single().and_then(parse_card_header) {
                tracing::debug!(card = %card, "card section");
                self.card_suffix = Some(card);
                continue;
            }

            if let Some(fields) = line.single().and_then(split_inline_row) {
                self.drop_pending("a new row started before this one was complete");
                match self.complete(fields) {
                    Some(record) => return Some(record),
                    None => continue,
                }
            }

            if Self::starts_row(&line) {
                self.drop_pending("a new row started before this one was complete");
                if line.single().is_some() {
                    self.pending = line.into_fields();
                    continue;
                }
                match self.complete(line.into_fields()) {
                    Some(record) => return Some(record),
                    None => continue,
                }
            }

            if self.pending.is_empty() {
                continue;
            }

            if line.single().is_none() {
                self.drop_pending("interrupted by a multi-column line");
                continue;
            }
            self.pending.extend(line.into_fields());

            if self.pending.len() == 3 {
                let fields = std::mem::take(&mut self.pending);
                if let Some(record) = self.complete(fields) {
                    return Some(record);
                }
            }
        }

        self.drop_pending("document ended before the row was complete");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{HtmlParser, MarkupParser};
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn extract(html: &str) -> Vec<PurchaseRecord> {
        let root = HtmlParser.parse(html.as_bytes()).unwrap();
        Records::new(&root).collect()
    }

    fn summary(records: &[PurchaseRecord]) -> Vec<(String, String, String, Option<String>)> {
        records
            .iter()
            .map(|r| {
                (
                    r.date.to_string(),
                    r.description.clone(),
                    r.amount.to_string(),
                    r.card_suffix.clone(),
                )
            })
            .collect()
    }

    fn expected(date: &str, description: &str, amount: &str, card: Option<&str>) -> (String, String, String, Option<String>) {
        (date.to_string(), description.to_string(), amount.to_string(), card.map(str::to_string))
    }

    const TWO_SECTIONS_TABLE: &str = r#"<html><body>
<p>Card ••1234</p>
<table>
<tr><td>01 JAN</td><td>Uber</td><td>12,50</td></tr>
<tr><td>02 JAN</td><td>Padaria</td><td>-3,00</td><td>9,50</td></tr>
<tr><td>03 JAN</td><td>Missing amount</td></tr>
</table>
<p>Card ••5678</p>
<table>
<tr><td>04 JAN</td><td>Mercado</td><td>R$ 1.234,56</td></tr>
<tr><td>05 JAN</td><td>Farmácia</td><td>45,00</td></tr>
<tr><td>06 JAN</td><td>Too</td><td>many</td><td>fields</td><td>here</td></tr>
</table>
</body></html>"#;

    const TWO_SECTIONS_LINES: &str = "<html><body>
Card ••1234<br/>
01 JAN<br/>
Uber<br/>
12,50<br/>
02 JAN<br/>
Padaria<br/>
-3,00<br/>
03 JAN<br/>
Missing amount<br/>
Card ••5678<br/>
04 JAN<br/>
Mercado<br/>
R$ 1.234,56<br/>
05 JAN<br/>
Farmácia<br/>
45,00<br/>
06 JAN<br/>
</body></html>";

    #[rstest]
    #[case(TWO_SECTIONS_TABLE)]
    #[case(TWO_SECTIONS_LINES)]
    fn test_two_sections_with_malformed_rows(#[case] html: &str) {
        let root = HtmlParser.parse(html.as_bytes()).unwrap();
        let mut records = Records::new(&root);
        let extracted: Vec<_> = records.by_ref().collect();

        assert_eq!(
            summary(&extracted),
            vec![
                expected("01 JAN", "Uber", "12.50", Some("1234")),
                expected("02 JAN", "Padaria", "-3.00", Some("1234")),
                expected("04 JAN", "Mercado", "1234.56", Some("5678")),
                expected("05 JAN", "Farmácia", "45.00", Some("5678")),
            ]
        );
        assert_eq!(records.emitted(), 4);
        assert_eq!(records.dropped(), 2);
    }

    #[test]
    fn test_card_between_date_and_description() {
        let html = "<html><body>
<a name=1></a>Fatura de janeiro<br/>
01 JAN<br/>
•••• 1234<br/>
Uber *Trip<br/>
R$ 12,50<br/>
02 JAN<br/>
•••• 9876<br/>
Netflix.com<br/>
R$ 39,90<br/>
03 JAN<br/>
•••• 1234<br/>
Estorno de compra<br/>
R$ -12,50<br/>
Total da fatura<br/>
R$ 39,90<br/>
</body></html>";

        assert_eq!(
            summary(&extract(html)),
            vec![
                expected("01 JAN", "Uber *Trip", "12.50", Some("1234")),
                expected("02 JAN", "Netflix.com", "39.90", Some("9876")),
                expected("03 JAN", "Estorno de compra", "-12.50", Some("1234")),
            ]
        );
    }

    #[test]
    fn test_rows_before_any_header_have_no_card() {
        let html = "<html><body>01 JAN<br/>Uber<br/>12,50<br/>Card ••1234<br/>02 JAN<br/>Taxi<br/>8,00<br/></body></html>";
        let records = extract(html);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].card_suffix, None);
        assert_eq!(records[1].card_suffix.as_deref(), Some("1234"));
    }

    #[test]
    fn test_header_without_purchases() {
        let html = "<html><body><p>Card ••1111</p><p>Card ••2222</p>
<table><tr><td>01 JAN</td><td>Uber</td><td>12,50</td></tr></table></body></html>";
        let records = extract(html);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].card_suffix.as_deref(), Some("2222"));
    }

    #[test]
    fn test_duplicate_rows_are_kept() {
        let html = "<html><body><p>Card ••1234</p><table>
<tr><td>01 JAN</td><td>Uber</td><td>12,50</td></tr>
<tr><td>01 JAN</td><td>Uber</td><td>12,50</td></tr>
</table></body></html>";
        let records = extract(html);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], records[1]);
    }

    #[test]
    fn test_decoration_is_skipped() {
        let html = "<html><body>
<table>
<tr><th>Data</th><th>Descrição</th><th>Valor</th></tr>
<tr><td>Total</td><td></td><td>R$ 12,50</td></tr>
</table>
<p>Pagamento mínimo: R$ 10,00</p>
<p>Card ••1234</p>
<table><tr><td>01 JAN</td><td>Uber</td><td>R$ 12,50</td></tr></table>
</body></html>";
        let records = extract(html);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, Decimal::from_str("12.50").unwrap());
    }

    #[test]
    fn test_unparseable_amount_drops_row_only() {
        let html = "<html><body><p>Card ••1234</p>
01 JAN<br/>Uber<br/>doze reais<br/>
02 JAN<br/>Taxi<br/>8,00<br/></body></html>";
        let root = HtmlParser.parse(html.as_bytes()).unwrap();
        let mut records = Records::new(&root);
        let extracted: Vec<_> = records.by_ref().collect();

        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].description, "Taxi");
        assert_eq!(records.dropped(), 1);
    }

    #[test]
    fn test_multi_column_line_interrupts_pending_row() {
        let html = "<html><body>01 JAN<br/>Uber<br/>
<table><tr><td>Subtotal</td><td>12,50</td></tr></table>
02 JAN<br/>Taxi<br/>8,00<br/></body></html>";
        let records = extract(html);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "Taxi");
    }

    #[test]
    fn test_empty_description_cell_drops_row() {
        let html = "<html><body><p>Card ••1234</p><table>
<tr><td>01 JAN</td><td></td><td>12,50</td><td>100,00</td></tr>
<tr><td>02 JAN</td><td>Taxi</td><td></td><td>100,00</td></tr>
<tr><td>03 JAN</td><td>Uber</td><td>8,00</td><td></td></tr>
</table></body></html>";
        let root = HtmlParser.parse(html.as_bytes()).unwrap();
        let mut records = Records::new(&root);
        let extracted: Vec<_> = records.by_ref().collect();

        assert_eq!(summary(&extracted), vec![expected("03 JAN", "Uber", "8.00", Some("1234"))]);
        assert_eq!(records.dropped(), 2);
    }

    #[rstest]
    #[case("<p>01 JAN Uber 12,50</p><p>02 JAN Padaria Real -3,00</p>")]
    #[case("01 JAN Uber 12,50<br/>02 JAN Padaria Real -3,00<br/>")]
    #[case("<p>01 JAN Uber R$ 12,50 112,50</p><p>02 JAN Padaria Real - R$ 3,00 109,50</p>")]
    fn test_rows_printed_on_one_line(#[case] body: &str) {
        let html = format!("<html><body><p>Card ••1234</p>{body}</body></html>");
        assert_eq!(
            summary(&extract(&html)),
            vec![
                expected("01 JAN", "Uber", "12.50", Some("1234")),
                expected("02 JAN", "Padaria Real", "-3.00", Some("1234")),
            ]
        );
    }

    #[test]
    fn test_one_line_row_after_incomplete_row() {
        let html = "<html><body>Card ••1234<br/>01 JAN<br/>Uber<br/>02 JAN Taxi 8,00<br/></body></html>";
        let root = HtmlParser.parse(html.as_bytes()).unwrap();
        let mut records = Records::new(&root);
        let extracted: Vec<_> = records.by_ref().collect();

        assert_eq!(summary(&extracted), vec![expected("02 JAN", "Taxi", "8.00", Some("1234"))]);
        assert_eq!(records.dropped(), 1);
    }

    #[test]
    fn test_masked_merchant_name_is_not_a_card_header() {
        let html = "<html><body>Card ••1234<br/>01 JAN<br/>MERCADOPAGO**4455<br/>12,50<br/>\
02 JAN<br/>•••• 5678<br/>PAG*Loja**9012<br/>R$ 30,00<br/></body></html>";
        assert_eq!(
            summary(&extract(html)),
            vec![
                expected("01 JAN", "MERCADOPAGO**4455", "12.50", Some("1234")),
                expected("02 JAN", "PAG*Loja**9012", "30.00", Some("5678")),
            ]
        );
    }

    #[test]
    fn test_empty_document_yields_nothing() {
        let root = Node::element("html", vec![Node::element("body", vec![])]);
        assert_eq!(Records::new(&root).count(), 0);
    }

    #[test]
    fn test_works_on_hand_built_tree() {
        let br = || Node::element("br", vec![]);
        let root = Node::element(
            "body",
            vec![
                Node::text("Card ••4321"),
                br(),
                Node::text("10 MAR"),
                br(),
                Node::text("Livraria"),
                br(),
                Node::text("59,90"),
                br(),
            ],
        );

        let records: Vec<_> = Records::new(&root).collect();
        assert_eq!(
            summary(&records),
            vec![expected("10 MAR", "Livraria", "59.90", Some("4321"))]
        );
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let root = HtmlParser.parse(TWO_SECTIONS_LINES.as_bytes()).unwrap();
        let first: Vec<_> = Records::new(&root).collect();
        let second: Vec<_> = Records::new(&root).collect();
        assert_eq!(first, second);
    }
}

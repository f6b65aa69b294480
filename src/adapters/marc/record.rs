//! Streaming MARCXML decoder

use crate::domain::{FetchError, FetchResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A subfield of a data field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subfield {
    pub code: String,
    pub value: String,
}

/// A control field (`00X`) or a data field with indicators and subfields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Control {
        tag: String,
        value: String,
    },
    Data {
        tag: String,
        ind1: String,
        ind2: String,
        subfields: Vec<Subfield>,
    },
}

impl Field {
    pub fn tag(&self) -> &str {
        match self {
            Field::Control { tag, .. } | Field::Data { tag, .. } => tag,
        }
    }

    /// Values stored under `code`
    ///
    /// A control field has a single unnamed value, returned whatever the code.
    pub fn values(&self, code: &str) -> Vec<&str> {
        match self {
            Field::Control { value, .. } => vec![value.as_str()],
            Field::Data { subfields, .. } => subfields
                .iter()
                .filter(|s| s.code == code)
                .map(|s| s.value.as_str())
                .collect(),
        }
    }

    /// First value stored under `code`
    pub fn value(&self, code: &str) -> Option<&str> {
        self.values(code).into_iter().next()
    }

    /// Indicator pair of a data field
    pub fn indicators(&self) -> Option<(&str, &str)> {
        match self {
            Field::Control { .. } => None,
            Field::Data { ind1, ind2, .. } => Some((ind1, ind2)),
        }
    }
}

/// A decoded bibliographic record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarcRecord {
    leader: String,
    fields: Vec<Field>,
}

/// Element currently receiving text
enum Open {
    Nothing,
    Leader,
    Control(String, String),
    Subfield(String, String),
}

impl MarcRecord {
    /// Decodes the first `<record>` of a MARCXML document
    ///
    /// Namespace prefixes (`marc:record`) are accepted. Leader and control
    /// field text is kept as sent, since its positions carry meaning;
    /// subfield values are trimmed.
    ///
    /// # Errors
    ///
    /// `FetchError::Decode` when the XML is malformed or holds no record.
    pub fn from_xml(xml: &str) -> FetchResult<Self> {
        let mut reader = Reader::from_str(xml);

        let mut record = MarcRecord::default();
        let mut seen_record = false;
        let mut open = Open::Nothing;
        let mut data: Option<Field> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"record" => seen_record = true,
                    b"leader" => open = Open::Leader,
                    b"controlfield" => open = Open::Control(attr(e, b"tag"), String::new()),
                    b"datafield" => data = Some(data_field(e)),
                    b"subfield" => open = Open::Subfield(attr(e, b"code"), String::new()),
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                    b"controlfield" => record.fields.push(Field::Control {
                        tag: attr(e, b"tag"),
                        value: String::new(),
                    }),
                    b"datafield" => record.fields.push(data_field(e)),
                    b"subfield" => {
                        if let Some(Field::Data { subfields, .. }) = data.as_mut() {
                            subfields.push(Subfield {
                                code: attr(e, b"code"),
                                value: String::new(),
                            });
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(t)) => {
                    let text = t.unescape().map_err(|e| {
                        FetchError::Decode(format!("Invalid MARCXML text: {e}"))
                    })?;
                    push_text(&mut open, &mut record.leader, &text);
                }
                Ok(Event::CData(t)) => {
                    let raw = t.into_inner();
                    push_text(&mut open, &mut record.leader, &String::from_utf8_lossy(&raw));
                }
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"leader" => open = Open::Nothing,
                    b"controlfield" => {
                        if let Open::Control(tag, value) = std::mem::replace(&mut open, Open::Nothing)
                        {
                            record.fields.push(Field::Control { tag, value });
                        }
                    }
                    b"subfield" => {
                        if let Open::Subfield(code, value) =
                            std::mem::replace(&mut open, Open::Nothing)
                        {
                            if let Some(Field::Data { subfields, .. }) = data.as_mut() {
                                subfields.push(Subfield {
                                    code,
                                    value: value.trim().to_string(),
                                });
                            }
                        }
                    }
                    b"datafield" => {
                        if let Some(field) = data.take() {
                            record.fields.push(field);
                        }
                    }
                    b"record" => break,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(FetchError::Decode(format!(
                        "Invalid MARCXML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
        }

        if !seen_record {
            return Err(FetchError::Decode(
                "MARCXML document has no <record> element".to_string(),
            ));
        }

        Ok(record)
    }

    pub fn leader(&self) -> &str {
        &self.leader
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// All fields carrying `tag`, in document order
    pub fn get_field(&self, tag: &str) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.tag() == tag).collect()
    }
}

fn push_text(open: &mut Open, leader: &mut String, text: &str) {
    match open {
        Open::Leader => leader.push_str(text),
        Open::Control(_, value) | Open::Subfield(_, value) => value.push_str(text),
        Open::Nothing => {}
    }
}

fn data_field(e: &BytesStart<'_>) -> Field {
    Field::Data {
        tag: attr(e, b"tag"),
        ind1: attr(e, b"ind1"),
        ind2: attr(e, b"ind2"),
        subfields: Vec::new(),
    }
}

fn attr(e: &BytesStart<'_>, name: &[u8]) -> String {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<record>
  <leader>     cam0 22        450 </leader>
  <controlfield tag="001">076254208</controlfield>
  <controlfield tag="008">Aax3</controlfield>
  <datafield tag="200" ind1="1" ind2=" ">
    <subfield code="a">Les Mis&#233;rables</subfield>
    <subfield code="f">Victor Hugo</subfield>
  </datafield>
  <datafield tag="930" ind1=" " ind2=" ">
    <subfield code="5">341722102:551234567</subfield>
    <subfield code="b">341722102</subfield>
    <subfield code="c">BU Lettres</subfield>
  </datafield>
  <datafield tag="930" ind1=" " ind2=" ">
    <subfield code="5">340000000:551234568</subfield>
  </datafield>
</record>"#;

    #[test]
    fn test_decode_fields() {
        let record = MarcRecord::from_xml(SAMPLE).unwrap();
        assert_eq!(record.leader(), "     cam0 22        450 ");
        assert_eq!(record.fields().len(), 5);

        let holdings = record.get_field("930");
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].values("5"), vec!["341722102:551234567"]);
        assert_eq!(holdings[0].value("c"), Some("BU Lettres"));
        assert!(holdings[1].values("c").is_empty());
        assert_eq!(holdings[0].indicators(), Some((" ", " ")));
    }

    #[test]
    fn test_control_field_ignores_code() {
        let record = MarcRecord::from_xml(SAMPLE).unwrap();
        let fixed = record.get_field("008");
        assert_eq!(fixed.len(), 1);
        assert_eq!(fixed[0].values("anything"), vec!["Aax3"]);
        assert_eq!(fixed[0].indicators(), None);
    }

    #[test]
    fn test_fixed_positions_are_preserved() {
        let xml = "<record>\n  <controlfield tag=\"008\"> Oa  </controlfield>\n  \
                   <datafield tag=\"930\" ind1=\" \" ind2=\" \">\n    \
                   <subfield code=\"c\">  Salle 1 </subfield>\n  </datafield>\n</record>";
        let record = MarcRecord::from_xml(xml).unwrap();
        assert_eq!(record.get_field("008")[0].values(""), vec![" Oa  "]);
        assert_eq!(record.get_field("930")[0].value("c"), Some("Salle 1"));
    }

    #[test]
    fn test_entities_are_unescaped() {
        let record = MarcRecord::from_xml(SAMPLE).unwrap();
        let title = record.get_field("200");
        assert_eq!(title[0].value("a"), Some("Les Misérables"));
    }

    #[test]
    fn test_namespaced_record() {
        let xml = r#"<marc:collection xmlns:marc="http://www.loc.gov/MARC21/slim">
<marc:record><marc:controlfield tag="008">Oa</marc:controlfield></marc:record>
</marc:collection>"#;
        let record = MarcRecord::from_xml(xml).unwrap();
        assert_eq!(record.get_field("008")[0].values(""), vec!["Oa"]);
    }

    #[test]
    fn test_missing_record_is_decode_error() {
        let err = MarcRecord::from_xml("<html><body>Not found</body></html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_malformed_xml_is_decode_error() {
        let err = MarcRecord::from_xml("<record><datafield tag=\"930\"></record>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_empty_input_is_decode_error() {
        assert!(MarcRecord::from_xml("").is_err());
    }
}

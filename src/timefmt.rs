//! Wire formats for calendar dates (`YYYY-MM-DD`) and zone-less date-times
//! (`YYYY-MM-DD HH:MM:SS`). Parsing is lenient: RFC 3339 input is accepted
//! and reduced to its date, or to its wall-clock date-time, and an empty
//! string means "absent".

use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime,
};

pub fn format_date(d: Date) -> Result<String, time::error::Format> {
    d.format(format_description!("[year]-[month]-[day]"))
}

pub fn format_datetime(dt: PrimitiveDateTime) -> Result<String, time::error::Format> {
    dt.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
}

pub fn parse_date(s: &str) -> Result<Date, time::error::Parse> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .or_else(|_| OffsetDateTime::parse(s, &Rfc3339).map(|dt| dt.date()))
}

pub fn parse_datetime(s: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(
        s,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            s,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    })
    .or_else(|_| {
        OffsetDateTime::parse(s, &Rfc3339).map(|dt| PrimitiveDateTime::new(dt.date(), dt.time()))
    })
}

pub mod option_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(value: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => {
                let txt = super::format_date(*d).map_err(<S::Error as serde::ser::Error>::custom)?;
                s.serialize_str(&txt)
            }
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
        match Option::<String>::deserialize(d)?.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => super::parse_date(raw)
                .map(Some)
                .map_err(<D::Error as serde::de::Error>::custom),
        }
    }
}

pub mod option_datetime {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::PrimitiveDateTime;

    pub fn serialize<S: Serializer>(
        value: &Option<PrimitiveDateTime>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => {
                let txt =
                    super::format_datetime(*dt).map_err(<S::Error as serde::ser::Error>::custom)?;
                s.serialize_str(&txt)
            }
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<PrimitiveDateTime>, D::Error> {
        match Option::<String>::deserialize(d)?.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => super::parse_datetime(raw)
                .map(Some)
                .map_err(<D::Error as serde::de::Error>::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn dates_accept_plain_and_rfc3339() {
        assert_eq!(parse_date("2024-05-01").unwrap(), date!(2024 - 05 - 01));
        assert_eq!(
            parse_date("2024-05-01T23:30:00+02:00").unwrap(),
            date!(2024 - 05 - 01)
        );
        assert!(parse_date("01/05/2024").is_err());
    }

    #[test]
    fn datetimes_accept_three_layouts() {
        let want = datetime!(2024-05-01 18:45:10);
        assert_eq!(parse_datetime("2024-05-01 18:45:10").unwrap(), want);
        assert_eq!(parse_datetime("2024-05-01T18:45:10").unwrap(), want);
        assert_eq!(parse_datetime("2024-05-01T18:45:10Z").unwrap(), want);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn formats_round_to_seconds() {
        assert_eq!(format_date(date!(2024 - 01 - 09)).unwrap(), "2024-01-09");
        assert_eq!(
            format_datetime(datetime!(2024-01-09 07:05:03)).unwrap(),
            "2024-01-09 07:05:03"
        );
    }
}

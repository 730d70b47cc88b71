use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use ics::{
    escape_text,
    parameters::TzIDParam,
    properties::{
        CalScale, Categories, Description, DtEnd, DtStart, Location, RRule, Summary, Transp,
        TzName,
    },
    Daylight, ICalendar, Standard, TimeZone,
};

use crate::{Calendar, CalendarEvent};

pub const TIMEZONE: &str = "Europe/Paris";

const LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

fn ics_base<'a>() -> ICalendar<'a> {
    let mut cet_standard = Standard::new("19701025T030000", "+0200", "+0100");
    cet_standard.push(TzName::new("CET"));
    cet_standard.push(RRule::new("FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU"));

    let mut cest_daylight = Daylight::new("19700329T020000", "+0100", "+0200");
    cest_daylight.push(TzName::new("CEST"));
    cest_daylight.push(RRule::new("FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU"));

    let mut timezone = TimeZone::daylight(TIMEZONE, cest_daylight);
    timezone.add_standard(cet_standard);

    let mut ics = ICalendar::new(Calendar::VERSION, Calendar::PRODUCT_ID);
    ics.push(CalScale::new(Calendar::SCALE));
    ics.add_timezone(timezone);

    ics
}

fn local_time(time: &DateTime<Tz>) -> String {
    time.format(LOCAL_FORMAT).to_string()
}

impl Calendar {
    #[must_use]
    pub fn to_ics(&self, stamp: DateTime<Utc>) -> ICalendar<'_> {
        let stamp = stamp.format(UTC_FORMAT).to_string();
        let mut icalendar = ics_base();

        for event in &self.events {
            icalendar.add_event(event.to_ics(stamp.clone()));
        }

        icalendar
    }

    /// Encodes the calendar and applies [`reader_compat`] to the result.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        reader_compat(&self.to_ics(Utc::now()).to_string()).into_bytes()
    }
}

impl CalendarEvent {
    #[must_use]
    pub fn to_ics(&self, stamp: String) -> ics::Event<'_> {
        let mut ics_event = ics::Event::new(self.id.as_str(), stamp);

        let mut start = DtStart::new(local_time(&self.start));
        start.add(TzIDParam::new(TIMEZONE));
        let mut end = DtEnd::new(local_time(&self.end));
        end.add(TzIDParam::new(TIMEZONE));

        ics_event.push(start);
        ics_event.push(end);
        ics_event.push(Summary::new(escape_text(self.title.as_str())));
        ics_event.push(Location::new(escape_text(self.location.as_str())));
        ics_event.push(Description::new(escape_text(self.description.as_str())));
        ics_event.push(Categories::new(self.category.as_str()));
        ics_event.push(ics::properties::Status::new(self.status.as_str()));
        ics_event.push(Transp::new("OPAQUE"));

        ics_event
    }
}

/// Undoes two encoder habits that common calendar readers trip over: long
/// lines folded with `CRLF SPACE`, and commas escaped as `\,`.
pub fn reader_compat(encoded: &str) -> String {
    encoded.replace("\r\n ", "").replace("\\,", ",")
}

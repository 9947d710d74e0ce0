//! Test fixtures: representative rows from the GEoREST induced seismicity
//! database.
//!
//! The rows are truncated to the columns the parser reads plus one it must
//! ignore (`type`). They exercise:
//!   - a quoted location containing a comma and a non-ASCII character
//!   - a row with blank coordinates (Lorca)
//!   - a dd/mm/yyyy date (Basel)
//!   - a blank country (Pohang)
//!   - an unparseable date that must be skipped (Landau)

/// Eight data rows; seven load, one is skipped for its date.
#[cfg(test)]
pub(crate) fn fixture_georest_csv() -> &'static str {
    "date,latitude,longitude,magnitude,seism_depth_max,country,location,type\n\
2013-10-01,40.36,0.67,4.3,6.0,Spain,\"Castor, Castellón\",gas storage\n\
2013-10-02,40.40,0.70,4.1,5.0,Spain,Castor,gas storage\n\
2011-05-11,,,5.1,2.0,Spain,Lorca,groundwater\n\
08/12/2006,47.5,7.5,3.4,4.7,Switzerland,Basel,geothermal\n\
2013-07-20,46.5,8.5,3.5,4.0,Switzerland,St. Gallen,geothermal\n\
2011-11-06,35.53,-96.77,5.7,3.2,United States,Prague Oklahoma,wastewater\n\
2017-11-15,36.1,129.37,5.5,4.5,,Pohang,geothermal\n\
n/a,49.2,8.1,2.7,3.0,Germany,Landau,geothermal\n"
}

/// The same catalog encoded as ISO-8859-1, as served by digital.csic.es.
#[cfg(test)]
pub(crate) fn fixture_georest_latin1_bytes() -> Vec<u8> {
    fixture_georest_csv()
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

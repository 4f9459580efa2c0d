use std::io::{Read, Write};

use super::domain::{Listing, RawListing};

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<RawListing>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    csv_reader.deserialize::<RawListing>().collect()
}

pub(crate) fn write_rows<'a, W, I>(writer: W, listings: I) -> Result<(), csv::Error>
where
    W: Write,
    I: IntoIterator<Item = &'a Listing>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    for listing in listings {
        csv_writer.serialize(listing)?;
    }
    csv_writer.flush()?;
    Ok(())
}

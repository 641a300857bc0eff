pub mod common;

use std::fs;

use common::{data_file, init_logger};
use xsvlib::{
    core::{
        batch::BatchByKey,
        column_map::{Column, ColumnMap},
        cursor::{RowCursor, XsvCursor},
        out_buffer::XsvOutBuffer,
        record::{RecordReaderExt, RecordWriter},
    },
    item::{
        options::{ReadOptions, WriteOptions},
        xsv::format::{read_xsv_cursor, read_xsv_path, write_xsv_path, XsvFormat},
    },
    Result,
};

struct StationCursor {
    inner: XsvCursor,
    id: Column,
    name: Column,
    city: Column,
    capacity: Column,
}

impl StationCursor {
    fn new() -> Result<Self> {
        let mut inner = XsvCursor::default();
        let columns = inner.columns_mut();
        let id = columns.declare("id")?;
        let name = columns.declare("name")?;
        let city = columns.declare("city")?;
        let capacity = columns.declare("capacity")?;
        Ok(StationCursor {
            inner,
            id,
            name,
            city,
            capacity,
        })
    }

    fn id(&self) -> Result<i32> {
        self.inner.get_i32(self.id)
    }

    fn name(&self) -> Result<&str> {
        self.inner.get_string(self.name)
    }

    fn city(&self) -> Result<&str> {
        self.inner.get_string(self.city)
    }

    fn capacity(&self) -> Result<i64> {
        self.inner.get_i64(self.capacity)
    }
}

impl RowCursor for StationCursor {
    fn cursor(&self) -> &XsvCursor {
        &self.inner
    }

    fn cursor_mut(&mut self) -> &mut XsvCursor {
        &mut self.inner
    }
}

#[test]
fn read_stations_with_custom_cursor() -> Result<()> {
    init_logger();
    let mut rows = read_xsv_cursor(
        data_file("stations.tsv"),
        StationCursor::new()?,
        &ReadOptions::default(),
    )?;

    let mut espoo_capacity = 0;
    let mut names = Vec::new();
    while let Some(station) = rows.next_row()? {
        if station.city()? == "Espoo" {
            espoo_capacity += station.capacity()?;
        }
        if station.id()? < 100 {
            names.push(station.name()?.to_string());
        }
    }

    assert_eq!(espoo_capacity, 38);
    assert_eq!(
        names,
        ["Kaivopuisto", "Laivasillankatu", "Kapteeninpuistikko"]
    );
    Ok(())
}

#[test]
fn group_stations_by_city() -> Result<()> {
    let mut columns = ColumnMap::new();
    let city = columns.declare("City")?;

    let mut reader = read_xsv_path(data_file("stations.tsv"), &ReadOptions::default())?
        .with_header()?;
    columns.require_bind(reader.header())?;
    let city_index = columns.index_of(city).unwrap_or_default();
    assert_eq!(city_index, 2);

    let records = reader.load_all()?;
    let groups: Vec<(String, usize)> = records
        .into_iter()
        .batch_by_key(|record| record[city_index].clone())
        .map(|batch| (batch[0][city_index].clone(), batch.len()))
        .collect();

    assert_eq!(
        groups,
        vec![("Espoo".to_string(), 2), ("Helsinki".to_string(), 3)]
    );
    Ok(())
}

#[test]
fn transient_tsv_file_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let transient = dir.path().join("capacity.tsv.tmp");
    let target = dir.path().join("capacity.tsv");

    let mut out = XsvOutBuffer::new(&["city", "name", "bikes"])?;
    let (city_out, name_out, bikes_out) =
        (out.column("city")?, out.column("name")?, out.column("bikes")?);

    let mut writer = write_xsv_path(&transient, &WriteOptions::default())?;
    assert_eq!(writer.format(), XsvFormat::Tsv);
    out.emit_header(&mut writer)?;

    let mut rows = read_xsv_cursor(
        data_file("stations.tsv"),
        StationCursor::new()?,
        &ReadOptions::default(),
    )?;
    while let Some(station) = rows.next_row()? {
        out.set(name_out, station.name()?)?;
        out.set(city_out, station.city()?)?;
        out.set(bikes_out, (station.capacity()? / 2).to_string())?;
        out.emit(&mut writer)?;
    }
    writer.finish_file()?;
    drop(writer);
    fs::rename(&transient, &target)?;

    let mut reader = read_xsv_path(&target, &ReadOptions::default())?.with_header()?;
    assert_eq!(reader.header(), ["city", "name", "bikes"]);
    let body = reader.load_all()?;
    assert_eq!(body.len(), 5);
    assert_eq!(body[0], vec!["Espoo", "Hanasaari", "5"]);
    assert_eq!(body[4], vec!["Helsinki", "Kapteeninpuistikko", "8"]);
    Ok(())
}

#[test]
fn tsv_keeps_spaces_and_quotes() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("raw.TSV");
    fs::write(&path, "a\tb\n \"x\" \t'y'\n")?;

    let mut reader = read_xsv_path(&path, &ReadOptions::default())?;
    assert_eq!(reader.format(), XsvFormat::Tsv);
    let records = reader.records().collect::<Result<Vec<_>>>()?;
    assert_eq!(records, vec![vec!["a", "b"], vec![" \"x\" ", "'y'"]]);
    Ok(())
}

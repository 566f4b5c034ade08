use mobile_geodatabase::{to_wkt, GeoDatabase};

fn main() {
    if let Err(err) = run() {
        eprintln!("read_geodatabase failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("Usage: read_geodatabase <file.geodatabase> [table]")?;
    let table_filter = args.next();

    let gdb = GeoDatabase::open(path)?;
    for table in gdb.tables()? {
        if let Some(filter) = &table_filter {
            if !table.name.eq_ignore_ascii_case(filter) {
                continue;
            }
        }
        if !table.has_geometry() {
            println!("{}: {} rows (no geometry)", table.name, table.row_count);
            continue;
        }

        println!(
            "{}: {} rows ({})",
            table.name,
            table.row_count,
            table.geometry_type.as_deref().unwrap_or("unknown type"),
        );
        for feature in gdb.read_table(&table.name)? {
            match feature.geometry() {
                Some(geometry) => println!("  {}", to_wkt(geometry)?),
                None => println!("  <no geometry>"),
            }
        }
    }

    Ok(())
}

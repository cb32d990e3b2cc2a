use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rust_xlsxwriter::Workbook;

/// Write a sample restaurant/chain dataset as CSV and XLSX.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Number of restaurants to generate
    #[arg(long, default_value_t = 40)]
    rows: usize,

    /// Directory the two files are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

/// Deterministic splitmix64 stream; the sample must not change between runs.
struct SampleRng(u64);

impl SampleRng {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next() % items.len() as u64) as usize]
    }
}

struct SampleRow {
    cluster_name_clean: String,
    normalized_main_chain: String,
    city: String,
    address: String,
    match_score: f64,
}

const COLUMNS: [&str; 5] = [
    "cluster_name_clean",
    "normalized_main_chain",
    "city",
    "address",
    "match_score",
];

fn generate(rows: usize, rng: &mut SampleRng) -> Vec<SampleRow> {
    let chains = ["Pizza Hut", "KFC", "Bembos", "Pardos Chicken", "Starbucks", "Norky's"];
    let cities = ["Lima", "Arequipa", "Trujillo", "Cusco", "Piura"];
    let streets = ["Av. Larco", "Jr. de la Unión", "Av. Arequipa", "Calle Mercaderes"];
    let noise = ["", " Express", " - Centro", " Delivery", " 2"];

    (0..rows)
        .map(|i| {
            let chain = rng.pick(&chains);
            let city = rng.pick(&cities);
            // A share of rows name a different chain than the restaurant,
            // so there is something to mark incorrect.
            let shown_chain = if rng.unit() < 0.25 {
                rng.pick(&chains)
            } else {
                chain
            };
            SampleRow {
                cluster_name_clean: format!("{chain}{} {city}", rng.pick(&noise)),
                normalized_main_chain: shown_chain.to_string(),
                city: city.to_string(),
                address: format!("{} {}", rng.pick(&streets), 100 + i * 7),
                match_score: (rng.unit() * 100.0).round() / 100.0,
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(COLUMNS)?;
    for r in rows {
        let score = r.match_score.to_string();
        writer.write_record([
            r.cluster_name_clean.as_str(),
            r.normalized_main_chain.as_str(),
            r.city.as_str(),
            r.address.as_str(),
            score.as_str(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_xlsx(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (i, r) in rows.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &r.cluster_name_clean)?;
        sheet.write_string(row, 1, &r.normalized_main_chain)?;
        sheet.write_string(row, 2, &r.city)?;
        sheet.write_string(row, 3, &r.address)?;
        sheet.write_number(row, 4, r.match_score)?;
    }
    workbook.save(path).context("saving workbook")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SampleRng(42);
    let rows = generate(args.rows, &mut rng);

    std::fs::create_dir_all(&args.out_dir).context("creating output directory")?;
    let csv_path = args.out_dir.join("sample_chains.csv");
    let xlsx_path = args.out_dir.join("sample_chains.xlsx");
    write_csv(&csv_path, &rows)?;
    write_xlsx(&xlsx_path, &rows)?;

    println!(
        "Wrote {} restaurants to {} and {}",
        rows.len(),
        csv_path.display(),
        xlsx_path.display()
    );
    Ok(())
}

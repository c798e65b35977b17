use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::Workbook;

const NULL_VALUE: f64 = -999.25;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Nominal log response of one lithology: (GR, RHOB, NPHI, PHIE, PERM).
fn facies_response(facies: &str) -> (f64, f64, f64, f64, f64) {
    match facies {
        "Sandstone" => (45.0, 2.30, 0.18, 0.22, 250.0),
        "Shale" => (115.0, 2.55, 0.32, 0.05, 0.5),
        "Limestone" => (25.0, 2.65, 0.08, 0.10, 15.0),
        _ => (70.0, 2.45, 0.20, 0.12, 40.0),
    }
}

/// Occasionally knock out a reading with the null value, or spike it.
fn degrade(value: f64, rng: &mut SimpleRng) -> f64 {
    let roll = rng.next_f64();
    if roll < 0.02 {
        NULL_VALUE
    } else if roll < 0.025 {
        value * 8.0
    } else {
        value
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // Depth: 1500 m → 2000 m at 0.5 m sampling, zoned in 25 m beds.
    let depths: Vec<f64> = (0..1000).map(|i| 1500.0 + i as f64 * 0.5).collect();
    let beds = ["Sandstone", "Shale", "Limestone", "Shale", "Sandstone", "Siltstone"];

    let mut gr = Vec::with_capacity(depths.len());
    let mut rhob = Vec::with_capacity(depths.len());
    let mut nphi = Vec::with_capacity(depths.len());
    let mut phie = Vec::with_capacity(depths.len());
    let mut perm = Vec::with_capacity(depths.len());
    let mut facies = Vec::with_capacity(depths.len());

    for &depth in &depths {
        let bed = beds[((depth - 1500.0) / 25.0) as usize % beds.len()];
        let (g, r, n, p, k) = facies_response(bed);

        gr.push(degrade(rng.gauss(g, 8.0).max(0.0), &mut rng));
        rhob.push(degrade(rng.gauss(r, 0.04), &mut rng));
        nphi.push(degrade(rng.gauss(n, 0.02).clamp(0.0, 0.6), &mut rng));
        phie.push(degrade(rng.gauss(p, 0.015).clamp(0.0, 0.4), &mut rng));
        perm.push(degrade((k * rng.gauss(1.0, 0.3).abs()).max(0.01), &mut rng));
        facies.push(bed);
    }

    let header = ["DEPTH", "GR", "RHOB", "NPHI", "PHIE", "PERM", "FACIES"];

    let schema = Arc::new(Schema::new(vec![
        Field::new("DEPTH", DataType::Float64, false),
        Field::new("GR", DataType::Float64, false),
        Field::new("RHOB", DataType::Float64, false),
        Field::new("NPHI", DataType::Float64, false),
        Field::new("PHIE", DataType::Float64, false),
        Field::new("PERM", DataType::Float64, false),
        Field::new("FACIES", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(depths.clone())),
            Arc::new(Float64Array::from(gr.clone())),
            Arc::new(Float64Array::from(rhob.clone())),
            Arc::new(Float64Array::from(nphi.clone())),
            Arc::new(Float64Array::from(phie.clone())),
            Arc::new(Float64Array::from(perm.clone())),
            Arc::new(StringArray::from(facies.clone())),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let parquet_path = "sample_well_log.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    // Write CSV with the same content
    let csv_path = "sample_well_log.csv";
    let mut csv_writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    csv_writer
        .write_record(header)
        .expect("Failed to write CSV header");
    for i in 0..depths.len() {
        csv_writer
            .write_record([
                depths[i].to_string(),
                gr[i].to_string(),
                rhob[i].to_string(),
                nphi[i].to_string(),
                phie[i].to_string(),
                perm[i].to_string(),
                facies[i].to_string(),
            ])
            .expect("Failed to write CSV row");
    }
    csv_writer.flush().expect("Failed to flush CSV");

    // Write an Excel workbook with the same content
    let xlsx_path = "sample_well_log.xlsx";
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in header.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *name)
            .expect("Failed to write xlsx header");
    }
    for (i, &depth) in depths.iter().enumerate() {
        let row = i as u32 + 1;
        let values = [depth, gr[i], rhob[i], nphi[i], phie[i], perm[i]];
        for (col, value) in values.into_iter().enumerate() {
            sheet
                .write_number(row, col as u16, value)
                .expect("Failed to write xlsx cell");
        }
        sheet
            .write_string(row, values.len() as u16, facies[i])
            .expect("Failed to write xlsx cell");
    }
    workbook.save(xlsx_path).expect("Failed to save workbook");

    let preview = pretty_format_batches(&[batch.slice(0, 5)]).expect("Failed to format preview");
    println!("{preview}");
    println!(
        "Wrote {} depth samples to {parquet_path}, {csv_path} and {xlsx_path}",
        depths.len()
    );
}

use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const N_PATIENTS: usize = 400;

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Vital signs of one synthetic patient, with the derived labels the
/// upstream transformation job would attach.
struct Record {
    heart_rate: f64,
    spo2: Option<f64>,
    temperature: f64,
    resp_rate: f64,
    risk_level: &'static str,
    anomaly: i64,
    masktype_label: &'static str,
}

fn simulate(rng: &mut SimpleRng) -> Record {
    let heart_rate = rng.gauss(82.0, 18.0).clamp(35.0, 190.0);
    let spo2 = rng.gauss(95.5, 2.5).clamp(78.0, 100.0);
    let temperature = rng.gauss(37.0, 0.6);
    let resp_rate = rng.gauss(17.0, 4.0).clamp(6.0, 45.0);

    // a few readings are lost by the sensor
    let spo2 = (rng.next_f64() > 0.03).then_some(spo2);

    let mut score = 0;
    if !(50.0..=110.0).contains(&heart_rate) {
        score += 2;
    }
    if spo2.is_some_and(|s| s < 92.0) {
        score += 2;
    }
    if temperature > 38.0 {
        score += 1;
    }
    if resp_rate > 24.0 {
        score += 1;
    }

    let risk_level = match score {
        0 => "low",
        1 => "moderate",
        2 | 3 => "high",
        _ => "critical",
    };
    let anomaly = i64::from(score >= 2);

    Record {
        heart_rate,
        spo2,
        temperature,
        resp_rate,
        risk_level,
        anomaly,
        masktype_label: rng.pick(&["N95", "surgical", "cloth", "none"]),
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let records: Vec<Record> = (0..N_PATIENTS).map(|_| simulate(&mut rng)).collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("patient_id", DataType::Int64, false),
        Field::new("heart_rate", DataType::Float64, false),
        Field::new("spo2", DataType::Float64, true),
        Field::new("temperature", DataType::Float64, false),
        Field::new("resp_rate", DataType::Float64, false),
        Field::new("risk_level", DataType::Utf8, false),
        Field::new("anomaly", DataType::Int64, false),
        Field::new("masktype_label", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(1..=N_PATIENTS as i64)),
            Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.heart_rate))),
            Arc::new(records.iter().map(|r| r.spo2).collect::<Float64Array>()),
            Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.temperature))),
            Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.resp_rate))),
            Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.risk_level))),
            Arc::new(Int64Array::from_iter_values(records.iter().map(|r| r.anomaly))),
            Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.masktype_label))),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let output_path = "vitals_transformed.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {N_PATIENTS} patient records to {output_path}");
}

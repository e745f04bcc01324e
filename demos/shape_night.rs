//! Shape a short synthetic night and print the chart payload

fn main() {
    let mut csv = String::from("timestamp,sleep_stage\n");
    // 30-second epochs: wake, light, deep, light, REM, wake
    let stages = [0, 0, 1, 2, 2, 3, 3, 3, 2, 4, 4, 4, 0];
    for (i, stage) in stages.iter().enumerate() {
        csv.push_str(&format!("{},{}\n", 1_600_000_000 + i * 30, stage));
    }

    match hypnoflux::csv_to_chart_json(csv) {
        Ok(chart) => print!("{chart}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}

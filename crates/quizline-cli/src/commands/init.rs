//! The `quizline init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizline.toml
    if std::path::Path::new("quizline.toml").exists() {
        println!("quizline.toml already exists, skipping.");
    } else {
        std::fs::write("quizline.toml", SAMPLE_CONFIG)?;
        println!("Created quizline.toml");
    }

    // Create sample question bank
    std::fs::create_dir_all("banks")?;
    let sample_path = std::path::Path::new("banks/sample.toml");
    if sample_path.exists() {
        println!("banks/sample.toml already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_BANK)?;
        println!("Created banks/sample.toml");
    }

    println!("\nNext steps:");
    println!("  1. Add your own questions to banks/ (.toml or .csv)");
    println!("  2. Run: quizline validate --bank banks/sample.toml");
    println!("  3. Run: quizline run --size 10");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizline configuration

bank = "banks/sample.toml"
default_size = 10
duration_minutes = 60
output_dir = "./quizline-results"
formats = ["json"]
"#;

const SAMPLE_BANK: &str = r#"[bank]
name = "Sample Questions"

[[questions]]
number = 1
prompt = "Which planet is closest to the Sun?"
correct = "B"
options = { A = "Venus", B = "Mercury", C = "Mars", D = "Earth" }

[[questions]]
number = 2
prompt = "What is the chemical symbol for sodium?"
correct = "C"
options = { A = "So", B = "S", C = "Na", D = "Sd" }

[[questions]]
number = 3
prompt = "How many sides does a hexagon have?"
correct = "D"
options = { A = "5", B = "7", C = "8", D = "6" }

[[questions]]
number = 4
prompt = "Which gas do plants absorb for photosynthesis?"
correct = "A"
options = { A = "Carbon dioxide", B = "Oxygen", C = "Nitrogen", D = "Helium" }

[[questions]]
number = 5
prompt = "What is 7 x 8?"
correct = "B"
options = { A = "54", B = "56", C = "58", D = "64", E = "48" }

[[questions]]
number = 6
prompt = "Which ocean is the largest?"
correct = "C"
options = { A = "Atlantic", B = "Indian", C = "Pacific", D = "Arctic" }

[[questions]]
number = 7
prompt = "Water boils at sea level at what temperature in Celsius?"
correct = "A"
options = { A = "100", B = "90", C = "110" }

[[questions]]
number = 8
prompt = "Which of these is a prime number?"
correct = "E"
options = { A = "21", B = "27", C = "33", D = "39", E = "37" }

[[questions]]
number = 9
prompt = "What is the hardest natural mineral?"
correct = "D"
options = { A = "Quartz", B = "Topaz", C = "Corundum", D = "Diamond" }

[[questions]]
number = 10
prompt = "How many minutes are in a day?"
correct = "B"
options = { A = "1240", B = "1440", C = "1460", D = "1400" }
"#;

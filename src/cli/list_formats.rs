use crate::error::Result;
use crate::parser::SourceFormat;

fn render() -> String {
    SourceFormat::ALL
        .iter()
        .map(|f| format!("{:<12} {}\n", f.name(), f.description()))
        .collect()
}

pub fn run() -> Result<()> {
    print!("{}", render());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_every_format_in_order() {
        let text = render();
        let names: Vec<&str> = text
            .lines()
            .map(|l| l.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(names, ["MoneyWallet", "Barclaycard", "Volksbank", "Comdirect", "DKB"]);
    }
}

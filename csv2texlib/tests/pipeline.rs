//! End-to-end behavior of the conversion pipeline.

use csv2texlib::config::FormatSpec;
use csv2texlib::query::{annotate, filter, sort, transform};
use csv2texlib::{convert, CellValue, Configuration, Table};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::str::FromStr;

fn config(yaml: &str) -> Configuration {
    Configuration::from_yaml_str(yaml).unwrap()
}

fn results_table() -> Table {
    Table::from_csv_str(
        "model,dataset,mse,year\n\
         gpt-base,alpha,0.312,2022\n\
         llama-ft,alpha,0.255,2023\n\
         debug-small,alpha,0.001,2023\n\
         baseline-oracle,alpha,0.100,2021\n\
         mistral,beta,0.255,2022\n\
         gpt-large,beta,0.287,2023\n",
    )
    .unwrap()
}

fn column_text(table: &Table, column: &str) -> Vec<String> {
    table
        .column_values(column)
        .unwrap()
        .map(|(_, c)| c.as_text().into_owned())
        .collect()
}

#[test]
fn test_format_code_examples() {
    let cases = [
        (0.856432, ".3f", "0.856"),
        (0.856432, ".2e", "8.56e-01"),
        (0.156, ".1%", "15.6%"),
        (45.67, ".0f", "46"),
        (2022.0, "d", "2022"),
    ];
    for (value, code, expected) in cases {
        let spec = FormatSpec::from_str(code).unwrap();
        assert_eq!(spec.render(value).as_deref(), Some(expected), "{value} {code}");
    }
}

#[test]
fn test_sort_is_idempotent() {
    let config = config(
        r#"
row_sorting:
  columns: [dataset, model]
  sort_orders:
    model: {mistral: 1, llama-ft: 2}
"#,
    );
    let once = sort(&results_table(), &config);
    let twice = sort(&once, &config);
    assert_eq!(once, twice);
}

#[test]
fn test_ranked_values_precede_unranked() {
    let config = config("model_order: {gpt-large: 1, mistral: 2}\n");
    let sorted = sort(&results_table(), &config);
    let models = column_text(&sorted, "model");

    assert_eq!(&models[..2], &["gpt-large", "mistral"]);
    // the rest in natural (textual) order
    assert_eq!(
        &models[2..],
        &["baseline-oracle", "debug-small", "gpt-base", "llama-ft"]
    );
}

#[test]
fn test_filter_is_a_subset() {
    let config = config(
        r#"
ignored_models: ["debug-*"]
row_filtering:
  exclude_from_calculations:
    model: ["baseline-*"]
"#,
    );
    let table = results_table();
    let result = filter(&table, &config);

    let all: BTreeSet<usize> = (0..table.row_count()).collect();
    let visible: BTreeSet<usize> = result.visible.iter().copied().collect();
    assert!(visible.is_subset(&all));
    let hidden: BTreeSet<usize> = all.difference(&visible).copied().collect();
    assert!(hidden.is_subset(&result.excluded_from_calc));
    assert_eq!(hidden, BTreeSet::from([2]));
    assert!(result.excluded_from_calc.contains(&3));
}

#[test]
fn test_cluster_exclusion_scenario() {
    let table = Table::from_csv_str("cluster,score\n0,1\n1,2\n2,3\n3,4\n4,5\n5,6\n").unwrap();
    let config = config("row_filtering:\n  exclude_values:\n    cluster: [\"4\", \"5\"]\n");
    let result = filter(&table, &config);
    assert_eq!(result.visible, vec![0, 1, 2, 3]);
}

#[test]
fn test_legacy_and_generalized_filters_agree() {
    let table = Table::from_csv_str("model,mse\ntest-model,0.1\nother,0.2\ntest-model,0.3\n").unwrap();
    let legacy = config("ignored_models: [\"test-model\"]\n");
    let generalized = config("row_filtering:\n  exclude_values:\n    model: [\"test-model\"]\n");

    let a = filter(&table, &legacy);
    let b = filter(&table, &generalized);
    assert_eq!(a.visible, b.visible);
    assert_eq!(a.visible, vec![1]);
}

#[test]
fn test_minima_hold_eligible_minimum() {
    let config = config(
        r#"
ignored_models: ["debug-*"]
ignored_models_in_calculation: ["baseline-*"]
"#,
    );
    let table = results_table();
    let filtered = filter(&table, &config);
    let minima = annotate(&table, &filtered, &config);

    let eligible_min = filtered
        .eligible()
        .filter_map(|i| table.cell(i, "mse").and_then(CellValue::as_number))
        .fold(f64::INFINITY, f64::min);
    for &row in &minima["mse"] {
        assert_eq!(table.cell(row, "mse").and_then(CellValue::as_number), Some(eligible_min));
    }
    // llama-ft and mistral tie on 0.255
    assert_eq!(minima["mse"], BTreeSet::from([1, 4]));
}

#[test]
fn test_minima_empty_when_nothing_eligible() {
    let config = config("ignored_models_in_calculation: [\"*\"]\n");
    let table = results_table();
    let minima = annotate(&table, &filter(&table, &config), &config);
    assert!(minima.is_empty());
}

#[test]
fn test_suffix_on_rendered_value() {
    let table = Table::from_csv_str("model,gen\na,0.0092\n").unwrap();
    let config = config(
        r#"
column_formats: {gen: .4f}
pattern_formatting:
  gen: {"92": "\\dagger"}
"#,
    );
    let display = transform(&table, &config);
    assert_eq!(display.display_rows()[0][1], "0.0092\\dagger");
}

#[test]
fn test_extra_column_is_inserted_unescaped() {
    let table = Table::from_csv_str("a,b,c,d\n1,2,3,4\n5,6,7,8\n").unwrap();
    let config = config(
        r#"
bold_headers: false
extra_columns:
  - {position: 2, display_name: "Res", value: "\\checkmark"}
"#,
    );
    let result = convert(&table, &config).unwrap();

    assert!(result.latex.contains("\\begin{tabular}{ccccc}"));
    assert!(result.latex.contains("A & B & Res & C & D \\\\"));
    let body: Vec<&str> = result
        .latex
        .lines()
        .filter(|l| l.contains("\\checkmark"))
        .collect();
    assert_eq!(body.len(), 2);
    for line in body {
        let cells: Vec<&str> = line.trim_end_matches(" \\\\").split(" & ").collect();
        assert_eq!(cells.len(), 5);
        assert_eq!(cells[2], "\\checkmark");
    }
}

#[test]
fn test_full_conversion() {
    let config = config(
        r#"
display_names:
  model: Model
  mse: 'MSE $\downarrow$'
column_formats: {mse: .2f, year: d}
model_order: {llama-ft: 1, gpt-base: 2}
latex_model_names: {llama-ft: 'LLaMA$^\dagger$'}
ignored_models: ["debug-*", "baseline-*"]
row_filtering:
  exclude_values:
    dataset: [beta]
caption: Results on alpha
label: tab:alpha
table_style: booktabs
column_underline: {year: false}
"#,
    );
    let table = results_table();
    let options = csv2texlib::ConvertOptions::new().columns(["model", "mse", "year"]);
    let result = csv2texlib::convert_with(&table, &config, &options).unwrap();

    let expected = "\\begin{table}[t]\n\
                    \\centering\n\
                    \\caption{Results on alpha}\n\
                    \\label{tab:alpha}\n\
                    \\begin{tabular}{ccc}\n\
                    \\toprule\n\
                    \\textbf{Model} & \\textbf{MSE $\\downarrow$} & \\textbf{Year} \\\\\n\
                    \\midrule\n\
                    LLaMA$^\\dagger$ & \\underline{$0.26$} & $2023$ \\\\\n\
                    gpt-base & $0.31$ & $2022$ \\\\\n\
                    \\bottomrule\n\
                    \\end{tabular}\n\
                    \\end{table}";
    assert_eq!(result.latex, expected);
    assert!(result.warnings.is_empty());
}

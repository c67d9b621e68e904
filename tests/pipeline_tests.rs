#[cfg(test)]
mod pipeline_tests {
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::{tempdir, TempDir};

    use dvn_analyzer::config::AnalysisConfig;
    use dvn_analyzer::orchestrator::{self, EXPANDED_FILE, JOINED_FILE, MAPPED_FEES_FILE};

    // Spreadsheet-style export: formula-wrapped cells, one malformed list
    const FEES_CSV: &str = "\
GUID,requiredDVNs,optionalDVNs,DVN_FEES_ARRAY
=\"0xAAA1\",=\"[ 0xaaa;0xbbb ]\",=\"[ 0xccc ]\",=\"[ 10;20;30 ]\"
0xaaa2,[0xaaa],,[1000000000000000000]
0xaaa3,not-a-list,[0xccc],[5;7]
";

    const NAMES_CSV: &str = "\
DVN_Address , DVN_Name
0xAAA,Alpha
0xbbb,Beta
0xccc,Gamma
";

    const DELIVERIES_CSV: &str = "\
GUID,SOURCETXHASH,MESSAGESTATUS,DELIVERED_BOOL,LATENCYTODELIVERY_SECONDS,SOURCETIMESTAMP
0xaaa1,0xt1,DELIVERED,TRUE,12,2025-10-01 10:00:00
0xAAA2,0xt2,DELIVERED,TRUE,30,2025-10-19 00:00:00
0xaaa9,0xt9,INFLIGHT,FALSE,N/A,2025-10-23 00:00:00
";

    struct Fixture {
        dir: TempDir,
        fees: PathBuf,
        names: PathBuf,
        deliveries: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let fees = dir.path().join("dvnFees.csv");
            let names = dir.path().join("dvnNames.csv");
            let deliveries = dir.path().join("dt_clean.csv");
            fs::write(&fees, FEES_CSV).unwrap();
            fs::write(&names, NAMES_CSV).unwrap();
            fs::write(&deliveries, DELIVERIES_CSV).unwrap();
            Self {
                dir,
                fees,
                names,
                deliveries,
            }
        }

        fn output(&self) -> PathBuf {
            self.dir.path().join("analysis_output")
        }

        /// Run `expand` with deliveries and names; returns the joined table path.
        fn expand_joined(&self) -> PathBuf {
            let outcome = orchestrator::run_expand(
                &self.fees,
                Some(&self.deliveries),
                Some(&self.names),
                &self.output(),
                &AnalysisConfig::default(),
            )
            .unwrap();
            outcome.joined_path.unwrap()
        }
    }

    fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_expand_writes_per_dvn_rows() {
        let fx = Fixture::new();
        let outcome = orchestrator::run_expand(
            &fx.fees,
            None,
            Some(&fx.names),
            &fx.output(),
            &AnalysisConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome.expansion.records, 3);
        assert_eq!(outcome.expansion.rows.len(), 5);
        // 0xaaa3 has two fees for a single optional verifier
        assert_eq!(outcome.expansion.ambiguous_records(), 1);
        assert!(outcome.joined_path.is_none());

        let lines = read_lines(&fx.output().join(EXPANDED_FILE));
        assert_eq!(
            lines[0],
            "GUID,DVN_ADDR,DVN_NAME,ROLE,DVN_FEE_WEI,DVN_FEE_ETH,DVN_FEE_IF_REQUIRED_ETH,DVN_FEE_IF_OPTIONAL_ETH,FEE_SOURCE"
        );
        assert_eq!(
            lines[1],
            "0xaaa1,0xaaa,Alpha,required,10,0.00000000000000001,0.00000000000000001,,positional"
        );
        assert_eq!(lines[3], "0xaaa1,0xccc,Gamma,optional,30,0.00000000000000003,,0.00000000000000003,positional");
        assert_eq!(lines[4], "0xaaa2,0xaaa,Alpha,required,1000000000000000000,1,1,,positional");
        assert_eq!(lines[5], "0xaaa3,0xccc,Gamma,optional,5,0.000000000000000005,,0.000000000000000005,positional");
        assert!(fx.output().join("expanded_kpi_by_dvn.csv").exists());
    }

    #[test]
    fn test_expand_joins_deliveries() {
        let fx = Fixture::new();
        let joined = fx.expand_joined();
        assert_eq!(joined, fx.output().join(JOINED_FILE));

        let lines = read_lines(&joined);
        assert!(lines[0].starts_with("GUID,DVN_ADDR,DVN_NAME,ROLE"));
        assert!(lines[0].ends_with("SOURCETXHASH,MESSAGESTATUS,DELIVERED_BOOL,LATENCYTODELIVERY_SECONDS,SOURCETIMESTAMP"));
        // Every expanded row appears once; 0xaaa3 has no delivery
        assert_eq!(lines.len(), 6);
        assert!(lines[5].starts_with("0xaaa3,"));
        assert!(lines[5].ends_with(",,,,,"));
    }

    #[test]
    fn test_map_names_then_expand_uses_mapping() {
        let fx = Fixture::new();
        let config = AnalysisConfig::default();
        let mapped = orchestrator::run_map_names(&fx.fees, &fx.names, &fx.output(), &config).unwrap();
        assert_eq!(mapped, fx.output().join(MAPPED_FEES_FILE));

        let table = dvn_analyzer::table::Table::load(&mapped).unwrap();
        let req = table.find_column(&["RequiredDVN_Mapping"]).unwrap();
        let opt = table.find_column(&["OptionalDVN_Mapping"]).unwrap();
        assert_eq!(table.rows[0][req], "[('Alpha', '10'), ('Beta', '20')]");
        assert_eq!(table.rows[0][opt], "[('Gamma', '30')]");
        assert_eq!(table.rows[2][req], "[]");
        assert_eq!(table.rows[2][opt], "[('Gamma', '5')]");

        // No names file: names and fees come from the mapping columns
        let second_output = fx.dir.path().join("second");
        let outcome = orchestrator::run_expand(&mapped, None, None, &second_output, &config).unwrap();
        assert_eq!(outcome.expansion.rows.len(), 5);
        assert_eq!(outcome.expansion.ambiguous_records(), 0);
        for row in &outcome.expansion.rows {
            assert_eq!(row.fee_source.to_string(), "mapping");
        }
        assert_eq!(outcome.expansion.rows[1].verifier_name.as_deref(), Some("Beta"));
    }

    #[test]
    fn test_kpi_from_joined_table() {
        let fx = Fixture::new();
        let joined = fx.expand_joined();
        let kpis = orchestrator::run_kpi(&joined, &fx.output(), &AnalysisConfig::default()).unwrap();

        let names: Vec<&str> = kpis.iter().map(|k| k.dvn_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Gamma", "Beta"]);

        let alpha = &kpis[0];
        assert_eq!(alpha.unique_messages, 2);
        assert_eq!(alpha.required_count, 2);
        assert_eq!(alpha.total_fees_eth.to_string(), "1.00000000000000001");
        assert_eq!(alpha.median_latency, Some(21.0));
        assert_eq!(alpha.delivered_rate, Some(1.0));

        let gamma = &kpis[1];
        assert_eq!(gamma.optional_count, 2);
        assert_eq!(gamma.delivered_messages, 1);
        assert_eq!(gamma.delivered_rate, Some(0.5));

        let lines = read_lines(&fx.output().join("kpi_by_dvn_final.csv"));
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("Alpha,2,2,2,0,1.00000000000000001,"));
    }

    #[test]
    fn test_fee_summary_from_expanded_table() {
        let fx = Fixture::new();
        fx.expand_joined();
        let summary = orchestrator::run_fee_summary(
            &fx.output().join(EXPANDED_FILE),
            &fx.output(),
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(summary.len(), 3);

        let lines = read_lines(&fx.output().join("dvn_fee_summary.csv"));
        assert_eq!(lines[0], "DVN_NAME,ROLE,rows,total_fee_eth,avg_fee_eth");
        assert_eq!(lines[1], "Alpha,required,2,1.00000000000000001,0.500000000000000005");
        assert_eq!(lines[3], "Gamma,optional,2,0.000000000000000035,0.0000000000000000175");
    }

    #[test]
    fn test_stacks_and_windows() {
        let fx = Fixture::new();
        let joined = fx.expand_joined();
        let config = AnalysisConfig::default();

        let stacks = orchestrator::run_stacks(&joined, &fx.output(), &config).unwrap();
        let labels: Vec<&str> = stacks.iter().map(|s| s.stack.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "Alpha + Beta"]);

        let reliability = read_lines(&fx.output().join("dvn_stack_reliability.csv"));
        assert_eq!(reliability[1], "Alpha,2,2,21,21");
        assert_eq!(reliability[2], "Beta,1,1,12,12");

        let windows = orchestrator::run_timeframe(&joined, &fx.output(), &config).unwrap();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].stacks[0].stack, "Alpha + Beta");
        // 2025-10-19T00:00:00Z is the first instant of the outage window
        assert_eq!(windows[1].stacks[0].stack, "Alpha");
        assert!(windows[2].stacks.is_empty());
        assert_eq!(
            fs::read_to_string(fx.output().join("stack_after.csv")).unwrap(),
            "Required_Stack,transactions,median_latency,avg_latency,p95_latency\n"
        );
        assert!(fx.output().join("dvn_before.csv").exists());
    }

    #[test]
    fn test_stack_series() {
        let fx = Fixture::new();
        let joined = fx.expand_joined();
        let series = orchestrator::run_stack_series(&joined, None, &fx.output(), &AnalysisConfig::default()).unwrap();
        assert_eq!(series.stacks, vec!["Alpha", "Alpha + Beta"]);

        let lines = read_lines(&fx.output().join("stack_time_series_top.csv"));
        assert_eq!(lines, vec!["day,Alpha,Alpha + Beta", "2025-10-01,,12", "2025-10-19,30,"]);
    }

    #[test]
    fn test_stack_reports_require_role_column() {
        let fx = Fixture::new();
        let err = orchestrator::run_stacks(&fx.deliveries, &fx.output(), &AnalysisConfig::default()).unwrap_err();
        assert!(format!("{}", err).contains("SOURCETXHASH"));
    }

    #[test]
    fn test_guid_match_between_exports() {
        let fx = Fixture::new();
        let report = orchestrator::run_guid_match(&fx.deliveries, &fx.fees, &fx.output()).unwrap();
        assert_eq!(report.left_unique, 3);
        assert_eq!(report.right_unique, 3);
        assert_eq!(report.common, 2);
        assert_eq!(report.left_only_sample, vec!["0xaaa9"]);
        assert_eq!(report.right_only_sample, vec!["0xaaa3"]);

        let json = fs::read_to_string(fx.output().join("guid_match_report.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["common"], 2);
    }

    #[test]
    fn test_operator_report() {
        let fx = Fixture::new();
        let joined = fx.expand_joined();
        let summary =
            orchestrator::run_operator(&joined, "Gamma", &fx.output(), &AnalysisConfig::default()).unwrap();
        assert_eq!(summary.involved_messages, 2);
        assert_eq!(summary.optional_messages, 2);
        assert_eq!(summary.optional_delivered, 1);
        assert_eq!(summary.avg_delivered_latency, Some(12.0));

        let rows = read_lines(&fx.output().join("operator_gamma_rows.csv"));
        assert_eq!(rows.len(), 3);
        assert!(fx.output().join("operator_gamma_summary.json").exists());
    }

    #[test]
    fn test_operator_report_tolerates_trailing_comma() {
        let fx = Fixture::new();
        let joined = fx.expand_joined();

        // Spreadsheet exports sometimes end a row with a stray separator
        let mut lines = read_lines(&joined);
        lines[3].push(',');
        let ragged = fx.dir.path().join("ragged_joined.csv");
        fs::write(&ragged, lines.join("\n") + "\n").unwrap();

        let summary =
            orchestrator::run_operator(&ragged, "Gamma", &fx.output(), &AnalysisConfig::default()).unwrap();
        assert_eq!(summary.involved_messages, 2);

        let rows = read_lines(&fx.output().join("operator_gamma_rows.csv"));
        assert_eq!(rows.len(), 3);
        let width = rows[0].split(',').count();
        assert!(rows.iter().all(|r| r.split(',').count() == width));
    }

    #[test]
    fn test_missing_guid_column_is_fatal() {
        let fx = Fixture::new();
        let bad = fx.dir.path().join("bad.csv");
        fs::write(&bad, "hash,requiredDVNs\n0x1,[0xaaa]\n").unwrap();

        let err = orchestrator::run_expand(&bad, None, None, &fx.output(), &AnalysisConfig::default())
            .unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.contains("hash"));
        assert!(msg.contains("requiredDVNs"));
    }
}

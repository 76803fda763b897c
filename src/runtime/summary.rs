use log::{info, warn};

///////////////////////////////
/// Counters of everything a stage skipped, discarded or produced.
/// Non-fatal conditions only ever increment a counter here; they never abort a stage
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    // Stage 1
    pub pairs_processed: u64,
    pub tra_pairs: u64,
    pub trb_pairs: u64,
    pub unclassified: u64,
    pub empty_after_trim: u64,
    pub unknown_bases: u64,
    pub record_count_mismatch: u64,

    // Stage 2
    pub tra_records: u64,
    pub tra_unique_umis: u64,
    pub trb_records: u64,
    pub trb_records_matched: u64,
    pub tag_collisions: u64,
    pub pairs_written: u64,

    // Matched FASTQ extraction
    pub reads_scanned: u64,
    pub reads_matched: u64,

    // Stage 3
    pub table_rows: u64,
    pub rows_off_locus: u64,
    pub rows_duplicate: u64,
    pub clones_written: u64,

    // Shared non-fatal categories
    pub unparsable_records: u64,
    pub rc_failures: u64,
    pub empty_results: u64,
}

impl RunSummary {
    pub fn new() -> RunSummary {
        RunSummary::default()
    }

    ///////////////////////////////
    /// Add up counters, e.g. from several worker threads
    pub fn add_summary(&mut self, other: &RunSummary) {
        self.pairs_processed += other.pairs_processed;
        self.tra_pairs += other.tra_pairs;
        self.trb_pairs += other.trb_pairs;
        self.unclassified += other.unclassified;
        self.empty_after_trim += other.empty_after_trim;
        self.unknown_bases += other.unknown_bases;
        self.record_count_mismatch += other.record_count_mismatch;

        self.tra_records += other.tra_records;
        self.tra_unique_umis += other.tra_unique_umis;
        self.trb_records += other.trb_records;
        self.trb_records_matched += other.trb_records_matched;
        self.tag_collisions += other.tag_collisions;
        self.pairs_written += other.pairs_written;

        self.reads_scanned += other.reads_scanned;
        self.reads_matched += other.reads_matched;

        self.table_rows += other.table_rows;
        self.rows_off_locus += other.rows_off_locus;
        self.rows_duplicate += other.rows_duplicate;
        self.clones_written += other.clones_written;

        self.unparsable_records += other.unparsable_records;
        self.rc_failures += other.rc_failures;
        self.empty_results += other.empty_results;
    }

    /// Number of non-fatal problems seen, across all categories
    pub fn num_warnings(&self) -> u64 {
        self.record_count_mismatch + self.unparsable_records + self.rc_failures + self.empty_results
    }

    ///////////////////////////////
    /// Print the counters that are relevant for a stage
    pub fn log_summary(&self, stage: &str) {
        info!("--- {} summary ---", stage);
        let all = [
            ("read pairs processed", self.pairs_processed),
            ("TRA pairs written", self.tra_pairs),
            ("TRB pairs written", self.trb_pairs),
            ("pairs without anchor", self.unclassified),
            ("pairs empty after trimming", self.empty_after_trim),
            ("unknown bases complemented", self.unknown_bases),
            ("TRA records indexed", self.tra_records),
            ("unique TRA UMIs", self.tra_unique_umis),
            ("TRB records scanned", self.trb_records),
            ("TRB records matching a TRA UMI", self.trb_records_matched),
            ("colliding reverse-complemented UMIs", self.tag_collisions),
            ("UMI pairing lines written", self.pairs_written),
            ("reads scanned", self.reads_scanned),
            ("reads matched", self.reads_matched),
            ("gene-call rows read", self.table_rows),
            ("rows with off-locus genes", self.rows_off_locus),
            ("rows with duplicate read IDs", self.rows_duplicate),
            ("paired clones written", self.clones_written),
        ];
        for (what, cnt) in all.iter().filter(|(_, cnt)| *cnt > 0) {
            info!("{}: {}", what, cnt);
        }

        let problems = [
            ("mate files of unequal length", self.record_count_mismatch),
            ("unparsable records skipped", self.unparsable_records),
            ("UMIs failing reverse complement", self.rc_failures),
            ("empty results", self.empty_results),
        ];
        for (what, cnt) in problems.iter().filter(|(_, cnt)| *cnt > 0) {
            warn!("{}: {}", what, cnt);
        }
    }
}

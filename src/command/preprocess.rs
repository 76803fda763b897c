use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use clap::Args;
use crossbeam::channel::{Receiver, Sender};
use log::{debug, info, warn};
use seq_io::fastq::OwnedRecord;
use seq_io::fastq::Reader as FastqReader;

use super::determine_thread_counts_1;
use crate::anchor::{AnchorPattern, Chain, Classification, OwnedTaggedReadPair, PairClassifier};
use crate::anchor::pattern::{UMI1_LEN, UMI2_LEN};
use crate::fileformat::{discover_input_pair, open_fastq, skip_malformed_record, PairedFastqWriter};
use crate::runtime::config::{trimmed_fastq_in, DEFAULT_PREFIX, DEFAULT_PREPROCESS_DIR};
use crate::runtime::{require_input, RunSummary};

type ListRecordPair = Arc<Vec<RecordPair>>;
type ListTaggedPair = Arc<Vec<OwnedTaggedReadPair>>;
type ListWriteResult = Arc<Mutex<Vec<anyhow::Result<(Chain, u64)>>>>;

pub const CHUNK_SIZE: usize = 1000;

#[derive(Args)]
pub struct PreprocessCMD {
    // FASTQ for r1
    #[arg(long = "r1", value_parser)]
    pub path_forward: Option<PathBuf>,

    // FASTQ for r2
    #[arg(long = "r2", value_parser)]
    pub path_reverse: Option<PathBuf>,

    // Directory to look for <sample>_1.fq.gz and <sample>_2.fq.gz, if --r1/--r2 not given
    #[arg(short = 'i', long = "input-dir", value_parser)]
    pub path_input_dir: Option<PathBuf>,

    // Output directory for trimmed reads
    #[arg(short = 'o', long = "output-dir", value_parser, default_value = DEFAULT_PREPROCESS_DIR)]
    pub path_output: PathBuf,

    // Prefix of output files. Defaults to the sample name if found with -i
    #[arg(short = 'p', long = "prefix", value_parser)]
    pub prefix: Option<String>,

    // Optional: stop after this many read pairs
    #[arg(short = 'n', long = "read-limit", value_parser = clap::value_parser!(u64))]
    pub read_limit: Option<u64>,

    #[arg(long = "umi1-len", value_parser = clap::value_parser!(usize), default_value_t = UMI1_LEN)]
    pub umi1_len: usize,

    #[arg(long = "umi2-len", value_parser = clap::value_parser!(usize), default_value_t = UMI2_LEN)]
    pub umi2_len: usize,

    //Thread settings
    #[arg(short = '@', value_parser = clap::value_parser!(usize))]
    pub num_threads_total: Option<usize>,
}
impl PreprocessCMD {
    /// Run the commandline option.
    /// This one takes raw FASTQ files, finds the TRA/TRB anchors, and trims the reads
    pub fn try_execute(&mut self) -> anyhow::Result<()> {
        let (path_forward, path_reverse, sample) = resolve_input_pair(
            &self.path_forward,
            &self.path_reverse,
            &self.path_input_dir,
        )?;
        let prefix = self
            .prefix
            .clone()
            .or(sample)
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let params = Preprocess {
            path_forward,
            path_reverse,
            path_output: self.path_output.clone(),
            prefix,
            read_limit: self.read_limit,
            tra_pattern: AnchorPattern::tra().with_umi_lengths(self.umi1_len, self.umi2_len),
            trb_pattern: AnchorPattern::trb().with_umi_lengths(self.umi1_len, self.umi2_len),
            threads_work: determine_thread_counts_1(self.num_threads_total)?,
        };
        let _ = Preprocess::run(Arc::new(params))?;

        info!("Preprocess has finished successfully");
        Ok(())
    }
}

///////////////////////////////
/// Mate files given explicitly take precedence over searching an input directory.
/// Returns the two mates, and the sample name if it was found by searching
pub fn resolve_input_pair(
    path_forward: &Option<PathBuf>,
    path_reverse: &Option<PathBuf>,
    path_input_dir: &Option<PathBuf>,
) -> anyhow::Result<(PathBuf, PathBuf, Option<String>)> {
    match (path_forward, path_reverse, path_input_dir) {
        (Some(r1), Some(r2), _) => {
            require_input(r1)?;
            require_input(r2)?;
            Ok((r1.clone(), r2.clone(), None))
        }
        (None, None, Some(dir)) => {
            let pair = discover_input_pair(dir)?;
            Ok((pair.path_r1, pair.path_r2, Some(pair.sample)))
        }
        _ => anyhow::bail!("Specify either both --r1 and --r2, or an input directory with -i"),
    }
}

#[derive(Debug, Clone)]
pub struct RecordPair {
    pub forward_record: OwnedRecord,
    pub reverse_record: OwnedRecord,
}

///////////////////////////////
/// Stage 1: classify read pairs by chain, trim away the anchor, tag the headers
#[derive(Debug, Clone)]
pub struct Preprocess {
    pub path_forward: PathBuf,
    pub path_reverse: PathBuf,
    pub path_output: PathBuf,
    pub prefix: String,
    pub read_limit: Option<u64>,
    pub tra_pattern: AnchorPattern,
    pub trb_pattern: AnchorPattern,
    pub threads_work: usize,
}

impl Preprocess {
    /// Output file of one chain and mate
    pub fn output_fastq(&self, chain: Chain, mate: u8) -> PathBuf {
        trimmed_fastq_in(&self.path_output, &self.prefix, chain, mate)
    }

    pub fn run(params: Arc<Preprocess>) -> anyhow::Result<RunSummary> {
        info!("Running command: preprocess");
        info!("Input R1: {}", params.path_forward.display());
        info!("Input R2: {}", params.path_reverse.display());
        if let Some(read_limit) = params.read_limit {
            info!("Read limit: {} pairs", read_limit);
        }

        let classifier = PairClassifier::new(params.tra_pattern.clone(), params.trb_pattern.clone())?;
        debug!("TRA anchor: {}", params.tra_pattern);
        debug!("TRB anchor: {}", params.trb_pattern);

        // Open fastq files
        let mut forward_file = open_fastq(&params.path_forward)?;
        let mut reverse_file = open_fastq(&params.path_reverse)?;

        fs::create_dir_all(&params.path_output)?;

        // Start writer threads, one per chain
        let list_written: ListWriteResult = Arc::new(Mutex::new(Vec::new()));
        let thread_pool_write = threadpool::ThreadPool::new(Chain::ALL.len());
        let tx_writer_tra = create_writer_thread(
            Chain::Tra,
            &params.output_fastq(Chain::Tra, 1),
            &params.output_fastq(Chain::Tra, 2),
            &thread_pool_write,
            &list_written,
        )?;
        let tx_writer_trb = create_writer_thread(
            Chain::Trb,
            &params.output_fastq(Chain::Trb, 1),
            &params.output_fastq(Chain::Trb, 2),
            &thread_pool_write,
            &list_written,
        )?;

        // Start worker threads.
        // Limit how many chunks can be in the air at the same time, as writers must be able to keep up with the reader
        let list_summary = Arc::new(Mutex::new(Vec::<RunSummary>::new()));
        let thread_pool_work = threadpool::ThreadPool::new(params.threads_work);
        let (tx, rx) = crossbeam::channel::bounded::<Option<ListRecordPair>>(100);
        for tidx in 0..params.threads_work {
            let rx = rx.clone();
            let tx_writer_tra = tx_writer_tra.clone();
            let tx_writer_trb = tx_writer_trb.clone();
            let classifier = classifier.clone();
            let list_summary = Arc::clone(&list_summary);

            debug!("Starting worker thread {}", tidx);
            thread_pool_work.execute(move || {
                let summary = loop_classify_worker(&classifier, &rx, &tx_writer_tra, &tx_writer_trb);
                if let Ok(mut list_summary) = list_summary.lock() {
                    list_summary.push(summary);
                }
            });
        }

        // Read the fastq files, send to worker threads
        info!("Starting to read input files");
        let mut summary = RunSummary::new();
        read_all_pairs(
            &mut forward_file,
            &mut reverse_file,
            &tx,
            params.read_limit,
            &mut summary,
        );

        // Send termination signals to workers, then wait for them to complete
        for _ in 0..params.threads_work {
            let _ = tx.send(None);
        }
        thread_pool_work.join();

        // Send termination signals to writers, then wait for them to complete
        let _ = tx_writer_tra.send(None);
        let _ = tx_writer_trb.send(None);
        thread_pool_write.join();

        // Collect counters from all workers
        {
            let list_summary = list_summary
                .lock()
                .map_err(|_| anyhow!("A worker thread panicked"))?;
            for one_summary in list_summary.iter() {
                summary.add_summary(one_summary);
            }
        }

        // Any failed writer fails the stage
        {
            let mut list_written = list_written
                .lock()
                .map_err(|_| anyhow!("A writer thread panicked"))?;
            if list_written.len() != Chain::ALL.len() {
                anyhow::bail!("A writer thread did not finish");
            }
            for result in list_written.drain(..) {
                let (chain, n_written) = result?;
                debug!("Wrote {} {} pairs", n_written, chain);
            }
        }

        if summary.record_count_mismatch > 0 {
            warn!("The two input FASTQ files have different numbers of records; extra records were ignored");
        }
        if summary.unknown_bases > 0 {
            warn!(
                "{} bases other than ACGTN were kept as-is when reverse complementing reads",
                summary.unknown_bases
            );
        }
        if summary.tra_pairs + summary.trb_pairs == 0 {
            warn!("No read pair had a TRA or TRB anchor");
            summary.empty_results += 1;
        }
        summary.log_summary("Preprocessing");
        Ok(summary)
    }
}

////////////////
/// Loop for a worker thread: classify chunks of read pairs and pass them on to the writer of their chain
fn loop_classify_worker(
    classifier: &PairClassifier,
    rx: &Receiver<Option<ListRecordPair>>,
    tx_writer_tra: &Sender<Option<ListTaggedPair>>,
    tx_writer_trb: &Sender<Option<ListTaggedPair>>,
) -> RunSummary {
    let mut summary = RunSummary::new();
    while let Ok(Some(list_pairs)) = rx.recv() {
        let mut pairs_tra: Vec<OwnedTaggedReadPair> = Vec::with_capacity(list_pairs.len());
        let mut pairs_trb: Vec<OwnedTaggedReadPair> = Vec::with_capacity(list_pairs.len());

        for rp in list_pairs.iter() {
            if let Classification::Classified(chain, pair) =
                classifier.classify(&rp.forward_record, &rp.reverse_record, &mut summary)
            {
                match chain {
                    Chain::Tra => pairs_tra.push(pair.to_owned_pair()),
                    Chain::Trb => pairs_trb.push(pair.to_owned_pair()),
                }
            }
        }

        if !pairs_tra.is_empty() {
            let _ = tx_writer_tra.send(Some(Arc::new(pairs_tra)));
        }
        if !pairs_trb.is_empty() {
            let _ = tx_writer_trb.send(Some(Arc::new(pairs_trb)));
        }
    }
    summary
}

////////////////
/// Writer for the two mate files of one chain. Files are created before the thread starts,
/// so that failing to create them is reported right away
fn create_writer_thread(
    chain: Chain,
    path_r1: &PathBuf,
    path_r2: &PathBuf,
    thread_pool: &threadpool::ThreadPool,
    list_written: &ListWriteResult,
) -> anyhow::Result<Sender<Option<ListTaggedPair>>> {
    info!("Creating {} output files: {}", chain, path_r1.display());
    let writer = PairedFastqWriter::new(path_r1, path_r2)?;
    let list_written = Arc::clone(list_written);

    //Limit how many chunks can be in pipe
    let (tx, rx) = crossbeam::channel::bounded::<Option<ListTaggedPair>>(100);
    thread_pool.execute(move || {
        let result = loop_pair_writer(chain, &rx, writer).map(|n| (chain, n));
        if let Ok(mut list_written) = list_written.lock() {
            list_written.push(result);
        }
    });
    Ok(tx)
}

////////////////
/// Loop for a writer thread. Stops at the first write error
fn loop_pair_writer(
    chain: Chain,
    rx: &Receiver<Option<ListTaggedPair>>,
    mut writer: PairedFastqWriter,
) -> anyhow::Result<u64> {
    while let Ok(Some(list_pairs)) = rx.recv() {
        for pair in list_pairs.iter() {
            writer.write_tagged_pair(pair)?;
            if writer.num_written % 100000 == 0 {
                info!("#{} pairs written: {}", chain, writer.num_written);
            }
        }
    }

    //Must finish to get a complete gzip file
    writer.finish()
}

enum NextPair {
    Pair(RecordPair),
    Skipped,
    End,
}

////////////////
/// Next pair of records. Both readers always advance by one unit, so a malformed
/// unit in either mate skips the whole pair and the mates stay in step
fn next_pair<R: Read>(
    forward_file: &mut FastqReader<R>,
    reverse_file: &mut FastqReader<R>,
    num_read: u64,
    summary: &mut RunSummary,
) -> NextPair {
    match (forward_file.next(), reverse_file.next()) {
        (None, None) => NextPair::End,
        (Some(Ok(forward_record)), Some(Ok(reverse_record))) => NextPair::Pair(RecordPair {
            forward_record: forward_record.to_owned_record(),
            reverse_record: reverse_record.to_owned_record(),
        }),
        (Some(Err(e)), _) => {
            if skip_malformed_record(&e, "R1", num_read, summary) {
                NextPair::Skipped
            } else {
                NextPair::End
            }
        }
        (_, Some(Err(e))) => {
            if skip_malformed_record(&e, "R2", num_read, summary) {
                NextPair::Skipped
            } else {
                NextPair::End
            }
        }
        _ => {
            warn!(
                "One input FASTQ file ended after {} pairs while the other continues; stopping",
                num_read
            );
            summary.record_count_mismatch += 1;
            NextPair::End
        }
    }
}

//////////
/// Read the reads, send to worker threads in chunks
fn read_all_pairs<R: Read>(
    forward_file: &mut FastqReader<R>,
    reverse_file: &mut FastqReader<R>,
    tx: &Sender<Option<ListRecordPair>>,
    read_limit: Option<u64>,
    summary: &mut RunSummary,
) {
    let mut num_read: u64 = 0;
    let mut done = false;
    while !done {
        //Read out chunks. By sending in blocks, we keep threads asleep until they got enough work to do
        let mut list_recpair: Vec<RecordPair> = Vec::with_capacity(CHUNK_SIZE);
        while list_recpair.len() < CHUNK_SIZE {
            if read_limit.is_some_and(|limit| num_read >= limit) {
                info!("Reached read limit of {} pairs", num_read);
                done = true;
                break;
            }
            match next_pair(forward_file, reverse_file, num_read, summary) {
                NextPair::Pair(recpair) => {
                    list_recpair.push(recpair);
                    num_read += 1;
                    if num_read % 100000 == 0 {
                        info!("read: {}", num_read);
                    }
                }
                NextPair::Skipped => {}
                NextPair::End => {
                    done = true;
                    break;
                }
            }
        }

        if !list_recpair.is_empty() {
            let _ = tx.send(Some(Arc::new(list_recpair)));
        }
    }
    info!("Read {} pairs in total", num_read);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::pattern::*;
    use seq_io::fastq::Record as FastqRecord;

    fn fastq(records: &[(&str, String)]) -> Vec<u8> {
        let mut out = Vec::new();
        for (head, seq) in records {
            out.extend_from_slice(format!("@{}\n{}\n+\n{}\n", head, seq, "I".repeat(seq.len())).as_bytes());
        }
        out
    }

    fn tra_read(umi1: &str, umi2: &str, tail: &str) -> String {
        format!("{}{}{}{}{}A{}", PRE_UMI1_TRA, umi1, LINKER_FWD_TRA, umi2, FLANK_TRA_SEQ, tail)
    }

    #[test]
    fn test_malformed_unit_skips_pair() {
        let mut r1 = fastq(&[("p1/1", "ACGT".to_string())]);
        r1.extend_from_slice(b"Xp2/1\nACGT\n+\nIIII\n");
        r1.extend(fastq(&[("p3/1", "ACGT".to_string())]));
        let r2 = fastq(&[
            ("p1/2", "TTTT".to_string()),
            ("p2/2", "TTTT".to_string()),
            ("p3/2", "TTTT".to_string()),
        ]);

        let (tx, rx) = crossbeam::channel::unbounded();
        let mut summary = RunSummary::new();
        read_all_pairs(
            &mut FastqReader::new(r1.as_slice()),
            &mut FastqReader::new(r2.as_slice()),
            &tx,
            None,
            &mut summary,
        );
        let chunk: ListRecordPair = rx.try_recv().unwrap().unwrap();
        assert_eq!(summary.unparsable_records, 1);
        assert_eq!(summary.record_count_mismatch, 0);

        //The pair after the bad unit is still read, with its own mate
        let heads: Vec<(&[u8], &[u8])> = chunk
            .iter()
            .map(|p| (p.forward_record.head(), p.reverse_record.head()))
            .collect();
        assert_eq!(
            heads,
            vec![(&b"p1/1"[..], &b"p1/2"[..]), (&b"p3/1"[..], &b"p3/2"[..])]
        );
    }

    #[test]
    fn test_read_all_pairs_limit_and_mismatch() {
        let r1 = fastq(&[
            ("p1/1", "ACGT".to_string()),
            ("p2/1", "ACGT".to_string()),
            ("p3/1", "ACGT".to_string()),
        ]);
        let r2 = fastq(&[("p1/2", "ACGT".to_string()), ("p2/2", "ACGT".to_string())]);

        let (tx, rx) = crossbeam::channel::unbounded();
        let mut summary = RunSummary::new();
        read_all_pairs(
            &mut FastqReader::new(r1.as_slice()),
            &mut FastqReader::new(r2.as_slice()),
            &tx,
            None,
            &mut summary,
        );
        let chunk: ListRecordPair = rx.try_recv().unwrap().unwrap();
        assert_eq!(chunk.len(), 2);
        assert_eq!(summary.record_count_mismatch, 1);

        let mut summary = RunSummary::new();
        read_all_pairs(
            &mut FastqReader::new(r1.as_slice()),
            &mut FastqReader::new(r2.as_slice()),
            &tx,
            Some(1),
            &mut summary,
        );
        let chunk: ListRecordPair = rx.try_recv().unwrap().unwrap();
        assert_eq!(chunk.len(), 1);
        assert_eq!(summary.record_count_mismatch, 0);
    }

    #[test]
    fn test_run_preprocess() {
        let dir = tempfile::tempdir().unwrap();
        let path_r1 = dir.path().join("S_1.fq");
        let path_r2 = dir.path().join("S_2.fq");

        let trb_mate2 = format!(
            "{}GGGGGGG{}TTTTTTT{}TCAGT",
            PRE_UMI1_TRB, LINKER_REV_TRB, FLANK_TRB_SEQ
        );
        fs::write(
            &path_r1,
            fastq(&[
                ("t1/1", tra_read("AAAAAAA", "CCCCCCC", "GGTT")),
                ("t2/1", "ACGTACGT".to_string()),
                ("t3/1", format!("{}.", "ACGT".repeat(22))),
                ("t4/1", tra_read("AAAAAAA", "CCCCCCC", "")),
            ]),
        )
        .unwrap();
        fs::write(
            &path_r2,
            fastq(&[
                ("t1/2", "TTTT".to_string()),
                ("t2/2", trb_mate2),
                ("t3/2", "ACGTACGT".to_string()),
                ("t4/2", "TTTT".to_string()),
            ]),
        )
        .unwrap();

        let params = Preprocess {
            path_forward: path_r1,
            path_reverse: path_r2,
            path_output: dir.path().join("out"),
            prefix: "S".to_string(),
            read_limit: None,
            tra_pattern: AnchorPattern::tra(),
            trb_pattern: AnchorPattern::trb(),
            threads_work: 2,
        };
        let summary = Preprocess::run(Arc::new(params.clone())).unwrap();
        assert_eq!(summary.pairs_processed, 4);
        assert_eq!(summary.tra_pairs, 1);
        assert_eq!(summary.trb_pairs, 1);
        assert_eq!(summary.unclassified, 1);
        assert_eq!(summary.empty_after_trim, 1);
        //Counted by the workers, reported once for the stage
        assert_eq!(summary.unknown_bases, 1);

        let mut reader = open_fastq(params.output_fastq(Chain::Tra, 1)).unwrap();
        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.head(), b"t1/1 TAG:TRA:AAAAAAA_CCCCCCC");
        assert_eq!(rec.seq(), b"GGTT");
        assert!(reader.next().is_none());

        let mut reader = open_fastq(params.output_fastq(Chain::Trb, 2)).unwrap();
        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.head(), b"t2/2 TAG:TRB:GGGGGGG_TTTTTTT");
        assert_eq!(rec.seq(), b"CAGT");
    }

    #[test]
    fn test_resolve_input_pair() {
        assert!(resolve_input_pair(&None, &None, &None).is_err());
        assert!(resolve_input_pair(&Some(PathBuf::from("/nonexistent_1.fq")), &None, &None).is_err());
    }
}

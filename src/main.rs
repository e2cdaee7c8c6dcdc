use clap::{arg,crate_version,Command};
use huffcompressor::{static_huff,STDRESULT,DYNERR};

const RCH: &str = "unreachable was reached";

fn ok_to_overwrite(path_out: &str) -> bool {
    if let Ok(_f) = std::fs::File::open(path_out) {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out);
        if std::io::stdin().read_line(&mut ans).is_err() {
            return false;
        }
        if ans.trim_end()=="y" || ans.trim_end()=="Y" {
            log::warn!("existing file will be resized to fit the new data");
            return true;
        }
        return false;
    }
    true
}

/// get the required paths and open the files, `None` means the user declined to overwrite
fn open_files(cmd: &clap::ArgMatches) -> Result<Option<(std::fs::File,std::fs::File)>,DYNERR> {
    let path_in = cmd.get_one::<String>("input").expect(RCH);
    let path_out = cmd.get_one::<String>("output").expect(RCH);
    if !ok_to_overwrite(path_out) {
        eprintln!("abort operation");
        return Ok(None);
    }
    let in_file = std::fs::File::open(path_in)?;
    let out_file = std::fs::OpenOptions::new().write(true).truncate(false).create(true).open(path_out)?;
    Ok(Some((in_file,out_file)))
}

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let long_help =
"Examples:
---------
Compress:      `huffcompressor compress -i my_expanded -o my_compressed`
Expand:        `huffcompressor expand -i my_compressed -o my_expanded`";

    let mut main_cmd = Command::new("huffcompressor")
        .about("Compress and expand with static Huffman coding")
        .after_long_help(long_help)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("expand a file"));

    let matches = main_cmd.get_matches();
    let start = std::time::Instant::now();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let (mut in_file,mut out_file) = match open_files(cmd)? {
            Some(files) => files,
            None => return Ok(())
        };
        let (in_size,out_size) = static_huff::compress(&mut in_file,&mut out_file,&static_huff::STD_OPTIONS)?;
        out_file.set_len(out_size)?;
        eprintln!("compressed {} into {}",in_size,out_size);
        if in_size > 0 {
            eprintln!("compression rate: {:.1}%",out_size as f64 / in_size as f64 * 100.0);
        }
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let (mut in_file,mut out_file) = match open_files(cmd)? {
            Some(files) => files,
            None => return Ok(())
        };
        let (in_size,out_size) = static_huff::expand(&mut in_file,&mut out_file,&static_huff::STD_OPTIONS)?;
        out_file.set_len(out_size)?;
        eprintln!("expanded {} into {}",in_size,out_size);
    }

    log::info!("elapsed time {:.3} seconds",start.elapsed().as_secs_f64());
    Ok(())
}

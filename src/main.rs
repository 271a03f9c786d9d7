use bigram_search::{digest_file, BigramError, Dictionary, Digest, MemoryStore, PersistentStore};
use std::env;
use std::path::Path;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <store.db|:memory:> <command> [args...]", program);
    eprintln!("Commands:");
    eprintln!("  add <file>...        index files under their content digest");
    eprintln!("  search <query>       print every source line where <query> occurs");
    eprintln!("  paths <hex-digest>   print the paths registered for a digest");
    eprintln!("  digest <file>        print the content digest of a file");
    std::process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        usage(&args[0]);
    }

    let store = &args[1];
    let command = args[2].as_str();
    let rest = &args[3..];

    let mut dict = if store == ":memory:" {
        Dictionary::new(MemoryStore::new())
    } else {
        match PersistentStore::open(store) {
            Ok(driver) => Dictionary::new(driver),
            Err(e) => {
                eprintln!("ERROR: Failed to open store {}", store);
                eprintln!("  {}", e);
                std::process::exit(1);
            }
        }
    };

    let result = match (command, rest) {
        ("add", files) if !files.is_empty() => files.iter().try_for_each(|file| {
            let digest = dict.add_file(file)?;
            println!("{}  {}", digest, file);
            Ok::<(), BigramError>(())
        }),
        ("search", [query]) => dict.search(query).and_then(|positions| {
            for position in &positions {
                let lines = dict.locate(position)?;
                if lines.is_empty() {
                    println!("{}\t{}", position.doc_id(), position.offset());
                }
                for (path, line_no, line) in lines {
                    println!("{}:{}: {}", path.display(), line_no, line);
                }
            }
            println!("{} match(es)", positions.len());
            Ok(())
        }),
        ("paths", [text]) => Digest::from_hex(text)
            .and_then(|digest| dict.lookup_digest(&digest))
            .map(|paths| {
                for path in paths {
                    println!("{}", path.display());
                }
            }),
        ("digest", [file]) => digest_file(Path::new(file)).map(|digest| println!("{}", digest)),
        _ => usage(&args[0]),
    };

    if let Err(e) = result {
        eprintln!("ERROR: {} failed", command);
        eprintln!("  {}", e);
        std::process::exit(1);
    }
}

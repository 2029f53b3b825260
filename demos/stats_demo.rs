use clap::Parser;
use seq_hash::HashTable;
use seq_hash::hash_table::Entry;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "count", default_value_t = 1000)]
    count: usize,

    /// Pre-size the table instead of growing from the default capacity.
    #[arg(long)]
    presize: bool,
}

fn main() {
    let args = Args::parse();

    let keys: Vec<String> = (0..args.count).map(|i| format!("symbol_{i}")).collect();

    let mut table = if args.presize {
        HashTable::with_capacity(args.count)
    } else {
        HashTable::new()
    };
    println!("Initial capacity: {}", table.capacity());
    println!("Filling table with {} keys...", keys.len());

    let mut num_failures = 0;
    for (i, key) in keys.iter().enumerate() {
        let inserted = match table.try_entry(key) {
            Ok(Entry::Vacant(entry)) => {
                entry.insert(i);
                true
            }
            Ok(Entry::Occupied(_)) => {
                panic!("Key already exists in table: {key}");
            }
            Err(_) => false,
        };

        if !inserted {
            num_failures += 1;
            table.set(key, i);
        }
    }

    println!("Inserted {} keys, capacity {}", table.len(), table.capacity());
    println!(
        "Final load factor: {:.2}%",
        (table.len() as f64 / table.capacity() as f64) * 100.0
    );

    table.probe_histogram().print();
    table.debug_stats().print();
    println!("Number of failed try_entry attempts: {num_failures}");
}

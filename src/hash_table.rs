//! The insertion-ordered open-addressing table.
//!
//! Slots live in one flat array and collisions are resolved by linear probing.
//! Occupied slots are additionally threaded into a singly linked list, by slot
//! index, in the order their keys were first inserted; iteration and rehashing
//! both walk that list instead of scanning the array.

use alloc::alloc::handle_alloc_error;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::config::TableConfig;
use crate::error::Error;
use crate::error::Result;
use crate::hash::DefaultKeyHasher;
use crate::hash::KeyHasher;

/// One occupied slot.
#[derive(Clone, Copy)]
struct Bucket<'k> {
    key: &'k [u8],
    hash: u32,
    value: usize,
    /// Next occupied slot in insertion order.
    next: Option<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Fallibility {
    Fallible,
    Infallible,
}

impl Fallibility {
    #[cold]
    #[inline(never)]
    fn capacity_overflow(self) -> Error {
        match self {
            Fallibility::Fallible => Error::CapacityOverflow,
            Fallibility::Infallible => panic!("capacity overflow"),
        }
    }

    #[cold]
    #[inline(never)]
    fn alloc_err(self, slots: usize) -> Error {
        match self {
            Fallibility::Fallible => {
                tracing::warn!(slots, "slot array allocation failed");
                Error::AllocFailed { slots }
            }
            Fallibility::Infallible => match Layout::array::<Option<Bucket<'static>>>(slots) {
                Ok(layout) => handle_alloc_error(layout),
                Err(_) => panic!("capacity overflow"),
            },
        }
    }
}

#[inline(always)]
fn infallible<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(_) => unreachable!("infallible allocation returned an error"),
    }
}

fn alloc_buckets<'k>(slots: usize, fallibility: Fallibility) -> Result<Vec<Option<Bucket<'k>>>> {
    let mut buckets = Vec::new();
    if buckets.try_reserve_exact(slots).is_err() {
        return Err(fallibility.alloc_err(slots));
    }
    buckets.resize(slots, None);
    Ok(buckets)
}

#[inline(always)]
fn home_index(hash: u32, capacity: usize) -> usize {
    (hash as u64 % capacity as u64) as usize
}

#[inline(always)]
fn next_index(index: usize, capacity: usize) -> usize {
    if index + 1 == capacity { 0 } else { index + 1 }
}

/// First empty slot on the probe sequence of `hash`. Used while rehashing,
/// where every key is already known to be distinct.
fn first_vacant(buckets: &[Option<Bucket<'_>>], hash: u32) -> usize {
    let capacity = buckets.len();
    let mut index = home_index(hash, capacity);
    while buckets[index].is_some() {
        index = next_index(index, capacity);
    }
    index
}

enum Probe {
    Occupied(usize),
    Vacant(usize),
}

/// An insertion-ordered hash table mapping borrowed byte-string keys to
/// `usize` words.
///
/// Keys are never copied: the table stores the `&'k [u8]` it was given, so
/// the key memory must outlive the table. Values are plain words and may
/// encode either integers or pointers; freeing whatever they refer to is left
/// to the caller, typically from [`iterate`](Self::iterate) before the table
/// is dropped or from the eviction callback of
/// [`set_with_eviction`](Self::set_with_eviction).
///
/// There is no removal. Once a key is present it stays present, and
/// iteration always yields keys in the order they were first inserted,
/// regardless of how many times the table has grown.
///
/// ## Example
///
/// ```rust
/// # use seq_hash::HashTable;
/// #
/// let mut table = HashTable::new();
/// table.set("a", 1);
/// table.set("b", 2);
/// table.set("c", 3);
///
/// assert_eq!(table.get("b"), Some(2));
/// assert_eq!(table.len(), 3);
///
/// let entries: Vec<(&[u8], usize)> = table.iter().collect();
/// assert_eq!(
///     entries,
///     [(&b"a"[..], 1), (&b"b"[..], 2), (&b"c"[..], 3)]
/// );
/// ```
#[derive(Clone)]
pub struct HashTable<'k, H = DefaultKeyHasher> {
    buckets: Vec<Option<Bucket<'k>>>,

    populated: usize,
    max_pop: usize,

    head: Option<usize>,
    tail: Option<usize>,

    config: TableConfig,
    hasher: H,
}

impl<H> Debug for HashTable<'_, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::string::ToString;

        struct Entries<'a, 'k>(Iter<'a, 'k>);

        impl Debug for Entries<'_, '_> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.debug_map()
                    .entries(self.0.clone().map(|(key, value)| (EscapedKey(key), value)))
                    .finish()
            }
        }

        f.debug_struct("HashTable")
            .field("populated", &self.populated)
            .field("capacity", &self.buckets.len())
            .field("load_limit", &self.max_pop)
            .field("entries", &Entries(self.iter()))
            .field(
                "slots",
                &self
                    .buckets
                    .chunks(16)
                    .map(|chunk| {
                        chunk
                            .iter()
                            .map(|slot| match slot {
                                Some(bucket) => format!("{:02x}", bucket.hash as u8),
                                None => "..".to_string(),
                            })
                            .collect::<Vec<String>>()
                            .join(", ")
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

struct EscapedKey<'a>(&'a [u8]);

impl Debug for EscapedKey<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "b\"{}\"", self.0.escape_ascii())
    }
}

impl<'k> HashTable<'k> {
    /// Creates an empty table with the default configuration and the
    /// pointer-width-selected [`DefaultKeyHasher`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use seq_hash::HashTable;
    /// #
    /// let table = HashTable::new();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 5);
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultKeyHasher::default())
    }

    /// Creates an empty table that can hold at least `capacity` entries
    /// before growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use seq_hash::HashTable;
    /// #
    /// let table = HashTable::with_capacity(100);
    /// assert!(table.load_limit() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultKeyHasher::default())
    }

    /// Creates an empty table sized by `config`.
    ///
    /// Fails if the configuration is invalid or the slot array cannot be
    /// allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use seq_hash::HashTable;
    /// # use seq_hash::TableConfig;
    /// #
    /// let config = TableConfig::default().with_initial_capacity(32);
    /// let table = HashTable::with_config(config)?;
    /// assert_eq!(table.capacity(), 32);
    ///
    /// assert!(HashTable::with_config(config.with_max_load_factor(1.0)).is_err());
    /// # Ok::<(), seq_hash::Error>(())
    /// ```
    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, DefaultKeyHasher::default())
    }
}

impl<'k> Default for HashTable<'k> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'k, H> HashTable<'k, H> {
    /// Creates an empty table with the default configuration that hashes keys
    /// with `hasher`.
    pub fn with_hasher(hasher: H) -> Self {
        infallible(Self::build(
            TableConfig::default(),
            hasher,
            Fallibility::Infallible,
        ))
    }

    /// Creates an empty table that can hold at least `capacity` entries before
    /// growing, hashing keys with `hasher`.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: H) -> Self {
        let mut config = TableConfig::default();
        let mut slots = ((capacity as f64 / config.max_load_factor) as usize).max(1);
        while config.load_limit(slots) < capacity {
            slots = slots
                .checked_add(1)
                .unwrap_or_else(|| panic!("capacity overflow"));
        }
        config.initial_capacity = slots;

        infallible(Self::build(config, hasher, Fallibility::Infallible))
    }

    /// Creates an empty table sized by `config`, hashing keys with `hasher`.
    pub fn with_config_and_hasher(config: TableConfig, hasher: H) -> Result<Self> {
        config.validate()?;
        Self::build(config, hasher, Fallibility::Fallible)
    }

    fn build(config: TableConfig, hasher: H, fallibility: Fallibility) -> Result<Self> {
        let buckets = alloc_buckets(config.initial_capacity, fallibility)?;

        Ok(Self {
            buckets,
            populated: 0,
            max_pop: config.load_limit(config.initial_capacity),
            head: None,
            tail: None,
            config,
            hasher,
        })
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no entries.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots in the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use seq_hash::HashTable;
    /// #
    /// let keys = ["a", "b", "c", "d", "e", "f"];
    /// let mut table = HashTable::new();
    /// for (value, key) in keys.iter().enumerate() {
    ///     table.set(*key, value);
    /// }
    /// assert_eq!(table.capacity(), 10);
    /// ```
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns how many entries the table holds before the next insertion
    /// grows it.
    pub fn load_limit(&self) -> usize {
        self.max_pop
    }

    /// Returns the sizing policy of the table.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Returns the key hasher of the table.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Returns an iterator over the entries in insertion order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use seq_hash::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.set("zeta", 26);
    /// table.set("alpha", 1);
    /// table.set("zeta", 0);
    ///
    /// let keys: Vec<&[u8]> = table.iter().map(|(key, _)| key).collect();
    /// assert_eq!(keys, [&b"zeta"[..], &b"alpha"[..]]);
    /// ```
    pub fn iter(&self) -> Iter<'_, 'k> {
        Iter {
            buckets: &self.buckets,
            cursor: self.head,
            remaining: self.populated,
        }
    }

    /// Calls `callback` with every key and value, in insertion order.
    ///
    /// Every entry is visited no matter how large the table is, which makes
    /// this the place to release whatever the keys or values own before the
    /// table is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use seq_hash::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.set("x", 3);
    /// table.set("y", 4);
    ///
    /// let mut total = 0;
    /// table.iterate(|_, value| total += value);
    /// assert_eq!(total, 7);
    /// ```
    pub fn iterate(&self, mut callback: impl FnMut(&'k [u8], usize)) {
        for (key, value) in self.iter() {
            callback(key, value);
        }
    }

    #[inline(always)]
    fn occupied(&self, index: usize) -> &Bucket<'k> {
        match &self.buckets[index] {
            Some(bucket) => bucket,
            None => unreachable!("slot {index} is not occupied"),
        }
    }

    #[inline(always)]
    fn occupied_mut(&mut self, index: usize) -> &mut Bucket<'k> {
        match &mut self.buckets[index] {
            Some(bucket) => bucket,
            None => unreachable!("slot {index} is not occupied"),
        }
    }

    /// Fills the empty slot `index` and appends it to the insertion order.
    fn occupy(&mut self, index: usize, key: &'k [u8], hash: u32, value: usize) -> &mut usize {
        debug_assert!(self.buckets[index].is_none());
        debug_assert!(self.populated < self.max_pop);

        match self.tail {
            Some(tail) => self.occupied_mut(tail).next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.populated += 1;

        let bucket = self.buckets[index].insert(Bucket {
            key,
            hash,
            value,
            next: None,
        });
        &mut bucket.value
    }

    #[inline]
    fn reserve_inner(&mut self, additional: usize, fallibility: Fallibility) -> Result<()> {
        let required = self
            .populated
            .checked_add(additional)
            .ok_or_else(|| fallibility.capacity_overflow())?;
        if required > self.max_pop {
            self.grow_for(required, fallibility)?;
        }
        Ok(())
    }

    #[cold]
    #[inline(never)]
    fn grow_for(&mut self, required: usize, fallibility: Fallibility) -> Result<()> {
        let mut capacity = self.buckets.len();
        while self.config.load_limit(capacity) < required {
            capacity = capacity
                .checked_mul(self.config.growth_factor)
                .ok_or_else(|| fallibility.capacity_overflow())?;
        }
        self.resize_rehash(capacity, fallibility)
    }

    /// Moves every entry into a fresh array of `capacity` slots, following the
    /// insertion order so the rebuilt list keeps it. The table is untouched if
    /// the allocation fails.
    fn resize_rehash(&mut self, capacity: usize, fallibility: Fallibility) -> Result<()> {
        debug_assert!(capacity > self.buckets.len());

        let mut buckets = alloc_buckets(capacity, fallibility)?;
        let mut head = None;
        let mut tail: Option<usize> = None;

        let mut cursor = self.head;
        while let Some(old_index) = cursor {
            let bucket = *self.occupied(old_index);
            cursor = bucket.next;

            let index = first_vacant(&buckets, bucket.hash);
            buckets[index] = Some(Bucket { next: None, ..bucket });

            match tail {
                Some(tail) => {
                    if let Some(prev) = &mut buckets[tail] {
                        prev.next = Some(index);
                    }
                }
                None => head = Some(index),
            }
            tail = Some(index);
        }

        tracing::debug!(
            from = self.buckets.len(),
            to = capacity,
            populated = self.populated,
            "resized hash table"
        );

        self.buckets = buckets;
        self.head = head;
        self.tail = tail;
        self.max_pop = self.config.load_limit(capacity);

        Ok(())
    }

    /// Computes a histogram of probe distances for the current table state.
    ///
    /// Bin `n` counts the entries that sit `n` slots past their home slot.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let capacity = self.buckets.len();
        let mut bins: Vec<usize> = Vec::new();

        for (index, slot) in self.buckets.iter().enumerate() {
            let Some(bucket) = slot else {
                continue;
            };
            let home = home_index(bucket.hash, capacity);
            let distance = if index >= home {
                index - home
            } else {
                index + (capacity - home)
            };
            if bins.len() <= distance {
                bins.resize(distance + 1, 0);
            }
            bins[distance] += 1;
        }

        ProbeHistogram { bins }
    }

    /// Returns utilization and probing statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let histogram = self.probe_histogram();
        let total_distance: usize = histogram
            .bins()
            .iter()
            .enumerate()
            .map(|(distance, count)| distance * count)
            .sum();

        DebugStats {
            populated: self.populated,
            capacity: self.buckets.len(),
            load_limit: self.max_pop,
            load_factor: self.populated as f64 / self.buckets.len() as f64,
            max_probe: histogram.bins().len().saturating_sub(1),
            mean_probe: if self.populated == 0 {
                0.0
            } else {
                total_distance as f64 / self.populated as f64
            },
            total_bytes: self.buckets.len() * core::mem::size_of::<Option<Bucket<'k>>>(),
        }
    }
}

impl<'k, H: KeyHasher> HashTable<'k, H> {
    /// Inserts `key` with `value`, or overwrites the value of an existing
    /// entry.
    ///
    /// Overwriting keeps the key reference, cached hash and position of the
    /// original entry. Use [`set_with_eviction`](Self::set_with_eviction) when
    /// the old key must be released.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use seq_hash::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.set("count", 1);
    /// table.set("count", 2);
    /// assert_eq!(table.get("count"), Some(2));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn set<K: AsRef<[u8]> + ?Sized>(&mut self, key: &'k K, value: usize) {
        self.entry(key).insert(value);
    }

    /// Fallible version of [`set`](Self::set). On error the table is left
    /// unchanged.
    pub fn try_set<K: AsRef<[u8]> + ?Sized>(&mut self, key: &'k K, value: usize) -> Result<()> {
        self.try_entry(key)?.insert(value);
        Ok(())
    }

    /// Inserts `key` with `value` unless it is already present.
    ///
    /// Returns the value now stored under `key` and whether the key existed
    /// before the call. An existing entry is left unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use seq_hash::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// assert_eq!(table.get_or_insert("id", 7), (7, false));
    /// assert_eq!(table.get_or_insert("id", 9), (7, true));
    /// assert_eq!(table.get("id"), Some(7));
    /// ```
    pub fn get_or_insert<K: AsRef<[u8]> + ?Sized>(
        &mut self,
        key: &'k K,
        value: usize,
    ) -> (usize, bool) {
        self.entry(key).get_or_insert(value)
    }

    /// Fallible version of [`get_or_insert`](Self::get_or_insert).
    pub fn try_get_or_insert<K: AsRef<[u8]> + ?Sized>(
        &mut self,
        key: &'k K,
        value: usize,
    ) -> Result<(usize, bool)> {
        Ok(self.try_entry(key)?.get_or_insert(value))
    }

    /// Like [`set`](Self::set), but when `key` is already present `evict` is
    /// called with the old key reference and old value before both are
    /// replaced by the new ones.
    ///
    /// `evict` is not called when `key` is inserted fresh.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use seq_hash::HashTable;
    /// #
    /// let first = String::from("name");
    /// let second = String::from("name");
    ///
    /// let mut table = HashTable::new();
    /// table.set(&first, 1);
    ///
    /// let mut evicted = Vec::new();
    /// table.set_with_eviction(&second, 2, |key, value| evicted.push((key.to_vec(), value)));
    ///
    /// assert_eq!(evicted, [(b"name".to_vec(), 1)]);
    /// assert_eq!(table.get("name"), Some(2));
    /// ```
    pub fn set_with_eviction<K, F>(&mut self, key: &'k K, value: usize, evict: F)
    where
        K: AsRef<[u8]> + ?Sized,
        F: FnOnce(&'k [u8], usize),
    {
        self.entry(key).insert_evicting(value, evict);
    }

    /// Fallible version of [`set_with_eviction`](Self::set_with_eviction).
    /// `evict` is not called if the table fails to grow.
    pub fn try_set_with_eviction<K, F>(&mut self, key: &'k K, value: usize, evict: F) -> Result<()>
    where
        K: AsRef<[u8]> + ?Sized,
        F: FnOnce(&'k [u8], usize),
    {
        self.try_entry(key)?.insert_evicting(value, evict);
        Ok(())
    }

    /// Returns the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use seq_hash::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.set(b"\x00\xff", 255);
    /// assert_eq!(table.get(b"\x00\xff"), Some(255));
    /// assert_eq!(table.get("missing"), None);
    /// assert_eq!(table.get("missing").unwrap_or_default(), 0);
    /// ```
    pub fn get<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<usize> {
        let key = key.as_ref();
        match self.probe(key, self.hasher.hash_key(key)) {
            Probe::Occupied(index) => Some(self.occupied(index).value),
            Probe::Vacant(_) => None,
        }
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Option<&mut usize> {
        let key = key.as_ref();
        match self.probe(key, self.hasher.hash_key(key)) {
            Probe::Occupied(index) => Some(&mut self.occupied_mut(index).value),
            Probe::Vacant(_) => None,
        }
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// Like every insertion path, this grows the table first if one more
    /// entry would exceed the load limit, even when `key` turns out to be
    /// present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use seq_hash::HashTable;
    /// # use seq_hash::hash_table::Entry;
    /// #
    /// let mut table = HashTable::new();
    /// match table.entry("key") {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert(10);
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    ///
    /// *table.entry("key").or_insert(0) += 1;
    /// assert_eq!(table.get("key"), Some(11));
    /// ```
    pub fn entry<K: AsRef<[u8]> + ?Sized>(&mut self, key: &'k K) -> Entry<'_, 'k, H> {
        infallible(self.entry_impl(key.as_ref(), Fallibility::Infallible))
    }

    /// Fallible version of [`entry`](Self::entry).
    pub fn try_entry<K: AsRef<[u8]> + ?Sized>(&mut self, key: &'k K) -> Result<Entry<'_, 'k, H>> {
        self.entry_impl(key.as_ref(), Fallibility::Fallible)
    }

    /// Grows the table so that `additional` more entries fit without another
    /// resize.
    pub fn reserve(&mut self, additional: usize) {
        infallible(self.reserve_inner(additional, Fallibility::Infallible));
    }

    /// Fallible version of [`reserve`](Self::reserve). On error the table is
    /// left unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use seq_hash::Error;
    /// # use seq_hash::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.set("kept", 1);
    /// assert_eq!(table.try_reserve(usize::MAX), Err(Error::CapacityOverflow));
    /// assert_eq!(table.get("kept"), Some(1));
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.reserve_inner(additional, Fallibility::Fallible)
    }

    fn entry_impl(&mut self, key: &'k [u8], fallibility: Fallibility) -> Result<Entry<'_, 'k, H>> {
        self.reserve_inner(1, fallibility)?;

        let hash = self.hasher.hash_key(key);
        Ok(match self.probe(key, hash) {
            Probe::Occupied(index) => Entry::Occupied(OccupiedEntry {
                table: self,
                index,
                key,
            }),
            Probe::Vacant(index) => Entry::Vacant(VacantEntry {
                table: self,
                index,
                key,
                hash,
            }),
        })
    }

    /// Walks the probe sequence of `key` until it finds the key or an empty
    /// slot. Terminates because the load limit keeps at least one slot empty.
    #[inline]
    fn probe(&self, key: &[u8], hash: u32) -> Probe {
        let capacity = self.buckets.len();
        let mut index = home_index(hash, capacity);
        loop {
            match &self.buckets[index] {
                None => return Probe::Vacant(index),
                // Length and hash are cheap filters before the byte compare.
                Some(bucket)
                    if bucket.key.len() == key.len()
                        && bucket.hash == hash
                        && bucket.key == key =>
                {
                    return Probe::Occupied(index);
                }
                Some(_) => index = next_index(index, capacity),
            }
        }
    }
}

impl<'k, K, H> Extend<(&'k K, usize)> for HashTable<'k, H>
where
    K: AsRef<[u8]> + ?Sized + 'k,
    H: KeyHasher,
{
    fn extend<I: IntoIterator<Item = (&'k K, usize)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<'k, K, H> FromIterator<(&'k K, usize)> for HashTable<'k, H>
where
    K: AsRef<[u8]> + ?Sized + 'k,
    H: KeyHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (&'k K, usize)>>(iter: I) -> Self {
        let mut table = Self::with_hasher(H::default());
        table.extend(iter);
        table
    }
}

impl<'a, 'k, H> IntoIterator for &'a HashTable<'k, H> {
    type Item = (&'k [u8], usize);
    type IntoIter = Iter<'a, 'k>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'k, H> IntoIterator for HashTable<'k, H> {
    type Item = (&'k [u8], usize);
    type IntoIter = IntoIter<'k>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            buckets: self.buckets,
            cursor: self.head,
            remaining: self.populated,
        }
    }
}

/// A view into a single entry in the table, which may be vacant or occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, 'k, H> {
    /// The key is not present in the table.
    Vacant(VacantEntry<'a, 'k, H>),
    /// The key is present in the table.
    Occupied(OccupiedEntry<'a, 'k, H>),
}

impl<'a, 'k, H> Entry<'a, 'k, H> {
    /// Returns the key of the stored entry if occupied, or the key being
    /// looked up if vacant.
    pub fn key(&self) -> &'k [u8] {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }

    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the stored value.
    pub fn or_insert(self, default: usize) -> &'a mut usize {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the stored value. `default` is not called for an
    /// occupied entry.
    pub fn or_insert_with(self, default: impl FnOnce() -> usize) -> &'a mut usize {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies `f` to the value of an occupied entry and returns a reference
    /// to it. Returns `None` without inserting for a vacant entry.
    pub fn and_modify(self, f: impl FnOnce(&mut usize)) -> Option<&'a mut usize> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Stores `value`, inserting the key if vacant. An occupied entry keeps
    /// its original key reference.
    pub fn insert(self, value: usize) -> &'a mut usize {
        match self {
            Entry::Occupied(mut entry) => {
                entry.insert(value);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(value),
        }
    }

    fn get_or_insert(self, value: usize) -> (usize, bool) {
        match self {
            Entry::Occupied(entry) => (*entry.get(), true),
            Entry::Vacant(entry) => (*entry.insert(value), false),
        }
    }

    fn insert_evicting(self, value: usize, evict: impl FnOnce(&'k [u8], usize)) {
        match self {
            Entry::Occupied(entry) => {
                let old_key = entry.key();
                tracing::trace!(key_len = old_key.len(), "evicting overwritten entry");
                evict(old_key, *entry.get());
                entry.replace(value);
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }
}

/// A view into a vacant entry in a [`HashTable`].
///
/// It is part of the [`Entry`] enum.
pub struct VacantEntry<'a, 'k, H> {
    table: &'a mut HashTable<'k, H>,
    index: usize,
    key: &'k [u8],
    hash: u32,
}

impl<'a, 'k, H> VacantEntry<'a, 'k, H> {
    /// Returns the key that would be inserted.
    pub fn key(&self) -> &'k [u8] {
        self.key
    }

    /// Inserts the key with `value`, appending it to the insertion order, and
    /// returns a mutable reference to the stored value.
    pub fn insert(self, value: usize) -> &'a mut usize {
        let VacantEntry {
            table,
            index,
            key,
            hash,
        } = self;
        table.occupy(index, key, hash, value)
    }
}

/// A view into an occupied entry in a [`HashTable`].
///
/// It is part of the [`Entry`] enum.
pub struct OccupiedEntry<'a, 'k, H> {
    table: &'a mut HashTable<'k, H>,
    index: usize,
    /// The key used for the lookup; equal in bytes to the stored one.
    key: &'k [u8],
}

impl<'a, 'k, H> OccupiedEntry<'a, 'k, H> {
    /// Returns the stored key reference.
    pub fn key(&self) -> &'k [u8] {
        self.table.occupied(self.index).key
    }

    /// Returns a reference to the stored value.
    pub fn get(&self) -> &usize {
        &self.table.occupied(self.index).value
    }

    /// Returns a mutable reference to the stored value.
    pub fn get_mut(&mut self) -> &mut usize {
        &mut self.table.occupied_mut(self.index).value
    }

    /// Converts the entry into a mutable reference to the stored value with
    /// the lifetime of the table borrow.
    pub fn into_mut(self) -> &'a mut usize {
        let table = self.table;
        &mut table.occupied_mut(self.index).value
    }

    /// Overwrites the stored value, keeping the stored key reference, and
    /// returns the old value.
    pub fn insert(&mut self, value: usize) -> usize {
        core::mem::replace(self.get_mut(), value)
    }

    /// Overwrites both the stored key reference, with the one used for this
    /// lookup, and the value. Returns the old key reference and value.
    ///
    /// The entry keeps its position in the insertion order.
    pub fn replace(self, value: usize) -> (&'k [u8], usize) {
        let key = self.key;
        let bucket = self.table.occupied_mut(self.index);
        let old = (bucket.key, bucket.value);
        bucket.key = key;
        bucket.value = value;
        old
    }
}

/// An iterator over the entries of a [`HashTable`] in insertion order.
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
#[derive(Clone)]
pub struct Iter<'a, 'k> {
    buckets: &'a [Option<Bucket<'k>>],
    cursor: Option<usize>,
    remaining: usize,
}

impl<'k> Iterator for Iter<'_, 'k> {
    type Item = (&'k [u8], usize);

    fn next(&mut self) -> Option<Self::Item> {
        let bucket = self.buckets[self.cursor?].as_ref()?;
        self.cursor = bucket.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((bucket.key, bucket.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_, '_> {}

impl FusedIterator for Iter<'_, '_> {}

/// An owning iterator over the entries of a [`HashTable`] in insertion order.
///
/// This struct is created by [`HashTable::into_iter`]. Dropping it releases
/// the slot array.
pub struct IntoIter<'k> {
    buckets: Vec<Option<Bucket<'k>>>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'k> Iterator for IntoIter<'k> {
    type Item = (&'k [u8], usize);

    fn next(&mut self) -> Option<Self::Item> {
        let bucket = self.buckets[self.cursor?].take()?;
        self.cursor = bucket.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((bucket.key, bucket.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for IntoIter<'_> {}

impl FusedIterator for IntoIter<'_> {}

/// Probe-distance histogram of a [`HashTable`].
///
/// Available in tests or with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    bins: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Entry counts indexed by probe distance.
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    /// Number of entries counted.
    pub fn total(&self) -> usize {
        self.bins.iter().sum()
    }

    /// Pretty-prints the histogram as a horizontal bar chart on stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.total());

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = ['▏', '▎', '▍', '▌', '▋', '▊', '▉'];
            if units % 8 > 0 {
                bar.push(partial[units % 8 - 1]);
            }
            bar
        };

        for (distance, &count) in self.bins.iter().enumerate() {
            println!("{:>3} | {} ({})", distance, make_bar(count), count);
        }
    }
}

/// Debug statistics for hash table analysis.
///
/// Available in tests or with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries in the table
    pub populated: usize,
    /// Number of slots
    pub capacity: usize,
    /// Population that triggers the next resize
    pub load_limit: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Longest probe distance of any entry
    pub max_probe: usize,
    /// Mean probe distance over all entries
    pub mean_probe: f64,
    /// Bytes used by the slot array
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} slots ({:.2}% load factor, resize above {})",
            self.populated,
            self.capacity,
            self.load_factor * 100.0,
            self.load_limit
        );
        println!(
            "Probing: max distance {}, mean distance {:.3}",
            self.max_probe, self.mean_probe
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

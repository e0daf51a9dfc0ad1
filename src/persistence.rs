// File: src/persistence.rs
use crate::core::profile::{FrequencyTable, LanguageProfile, RankedProfile};
use crate::core::types::LanguageId;
use crate::error::{LangIdError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// `<language>.ngrams.txt`: one n-gram per line, line 1 = rank 1.
pub const PROFILE_SUFFIX: &str = ".ngrams.txt";
/// `<language>.freq.txt`: `ngram<TAB>count` per line in rank order. Diagnostic only.
pub const FREQUENCY_SUFFIX: &str = ".freq.txt";

const BUNDLE_VERSION: u32 = 1;
const BYTE_ORDER_MARK: char = '\u{feff}';

/// The serializable state of a whole profile set.
#[derive(Serialize, Deserialize)]
struct ProfileBundle {
    version: u32,
    profiles: Vec<(LanguageId, RankedProfile)>,
}

pub fn profile_path(dir: &Path, language: &str) -> PathBuf {
    dir.join(format!("{}{}", language, PROFILE_SUFFIX))
}

pub fn frequency_path(dir: &Path, language: &str) -> PathBuf {
    dir.join(format!("{}{}", language, FREQUENCY_SUFFIX))
}

pub fn write_profile<W: Write>(profile: &RankedProfile, mut writer: W) -> std::io::Result<()> {
    for gram in profile.ngrams() {
        writeln!(writer, "{}", gram)?;
    }
    writer.flush()
}

/// Parses the line format back into a profile; line index + 1 is the rank.
pub fn read_profile<R: BufRead>(language: &str, reader: R) -> Result<RankedProfile> {
    let mut ngrams = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| LangIdError::MalformedProfile {
            language: language.to_string(),
            reason: e.to_string(),
        })?;
        let mut gram = line.trim_end_matches('\r');
        if i == 0 {
            gram = gram.strip_prefix(BYTE_ORDER_MARK).unwrap_or(gram);
        }
        ngrams.push(gram.to_string());
    }
    RankedProfile::from_ranked_ngrams(language, ngrams)
}

/// Writes to a temp file next to `path`, then renames it into place.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&NamedTempFile>) -> std::io::Result<()>,
{
    let parent_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir).map_err(|e| LangIdError::io(parent_dir, e))?;

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| LangIdError::io(parent_dir, e))?;
    {
        let mut writer = BufWriter::new(&temp_file);
        write(&mut writer).map_err(|e| LangIdError::io(path, e))?;
    }
    temp_file
        .persist(path)
        .map_err(|e| LangIdError::io(path, e.error))?;
    Ok(())
}

pub fn save_profile(path: &Path, profile: &RankedProfile) -> Result<()> {
    write_atomically(path, |w| write_profile(profile, w))
}

pub fn load_profile(path: &Path, language: &str) -> Result<RankedProfile> {
    let file = File::open(path).map_err(|e| LangIdError::io(path, e))?;
    read_profile(language, BufReader::new(file))
}

pub fn save_frequency_table(path: &Path, table: &FrequencyTable) -> Result<()> {
    write_atomically(path, |w| {
        for (gram, count) in table.sorted_entries() {
            writeln!(w, "{}\t{}", gram, count)?;
        }
        w.flush()
    })
}

/// Writes `<language>.ngrams.txt` for every profile into `dir`, then removes
/// profile and frequency files of languages that are not in `profiles`, so the
/// directory always reloads as exactly this set.
pub fn save_profile_dir(dir: &Path, profiles: &[LanguageProfile]) -> Result<()> {
    for profile in profiles {
        save_profile(&profile_path(dir, profile.language()), profile.profile())?;
    }
    let keep: HashSet<&str> = profiles.iter().map(|p| p.language()).collect();
    remove_stale_files(dir, &keep)?;
    info!("Saved {} profiles to {}", profiles.len(), dir.display());
    Ok(())
}

fn remove_stale_files(dir: &Path, keep: &HashSet<&str>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| LangIdError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| LangIdError::io(dir, e))?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let language = name
            .strip_suffix(PROFILE_SUFFIX)
            .or_else(|| name.strip_suffix(FREQUENCY_SUFFIX));
        if let Some(language) = language {
            if !keep.contains(language) && path.is_file() {
                info!("Removing stale profile file {}", path.display());
                fs::remove_file(&path).map_err(|e| LangIdError::io(&path, e))?;
            }
        }
    }
    Ok(())
}

/// Loads every `*.ngrams.txt` in `dir`, keyed by file stem, sorted by language.
pub fn load_profile_dir(dir: &Path) -> Result<Vec<LanguageProfile>> {
    let entries = fs::read_dir(dir).map_err(|e| LangIdError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| LangIdError::io(dir, e))?.path();
        let language = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(PROFILE_SUFFIX))
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        if let Some(language) = language {
            files.push((language, path));
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(LangIdError::NoProfiles);
    }

    let profiles = files
        .into_iter()
        .map(|(language, path)| {
            load_profile(&path, &language).map(|ranked| LanguageProfile::new(language, ranked))
        })
        .collect::<Result<Vec<_>>>()?;

    info!("Loaded {} profiles from {}", profiles.len(), dir.display());
    Ok(profiles)
}

pub fn save_bundle(path: &Path, profiles: &[LanguageProfile]) -> Result<()> {
    let bundle = ProfileBundle {
        version: BUNDLE_VERSION,
        profiles: profiles
            .iter()
            .map(|p| (p.language().to_string(), p.profile().clone()))
            .collect(),
    };
    let bytes = bincode::serialize(&bundle)?;
    write_atomically(path, |w| {
        w.write_all(&bytes)?;
        w.flush()
    })?;
    info!("Saved bundle of {} profiles to {}", profiles.len(), path.display());
    Ok(())
}

/// Loads a bundle, re-validating every profile as if read from text.
pub fn load_bundle(path: &Path) -> Result<Vec<LanguageProfile>> {
    let file = File::open(path).map_err(|e| LangIdError::io(path, e))?;
    let bundle: ProfileBundle = bincode::deserialize_from(BufReader::new(file))?;
    if bundle.version != BUNDLE_VERSION {
        return Err(LangIdError::MalformedProfile {
            language: path.display().to_string(),
            reason: format!("unsupported bundle version {}", bundle.version),
        });
    }
    if bundle.profiles.is_empty() {
        return Err(LangIdError::NoProfiles);
    }
    bundle
        .profiles
        .into_iter()
        .map(|(language, ranked)| {
            let ranked = RankedProfile::from_ranked_ngrams(&language, ranked.into_ngrams())?;
            Ok(LanguageProfile::new(language, ranked))
        })
        .collect()
}

/// Loads a profile directory or, if `path` is a file, a bundle.
pub fn load_profiles(path: &Path) -> Result<Vec<LanguageProfile>> {
    if path.is_file() {
        load_bundle(path)
    } else {
        load_profile_dir(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained(language: &str, text: &str) -> LanguageProfile {
        let mut table = FrequencyTable::new();
        table.add_text(text);
        LanguageProfile::new(language, RankedProfile::from_table(&table))
    }

    #[test]
    fn profile_round_trip_preserves_ranks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("english.ngrams.txt");
        let original = trained("english", "the quick brown fox jumps over the lazy dog");

        save_profile(&path, original.profile()).unwrap();
        let reloaded = LanguageProfile::new("english", load_profile(&path, "english").unwrap());

        assert_eq!(reloaded.profile(), original.profile());
        for (rank, gram) in original.profile().iter() {
            assert_eq!(reloaded.rank_of(gram), Some(rank));
        }
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), original.len());
    }

    #[test]
    fn crlf_lines_are_accepted() {
        let profile = read_profile("x", "e\r\nt\r\nth\r\n".as_bytes()).unwrap();
        assert_eq!(profile.ngrams(), &["e", "t", "th"]);
    }

    #[test]
    fn leading_byte_order_mark_is_dropped() {
        let profile = read_profile("x", "\u{feff}e\nt\n".as_bytes()).unwrap();
        assert_eq!(profile.ngrams(), &["e", "t"]);
        let lang = LanguageProfile::new("x", profile);
        assert_eq!(lang.rank_of("e"), Some(1));
    }

    #[test]
    fn resaving_a_smaller_set_drops_old_languages() {
        let dir = tempfile::tempdir().unwrap();
        let english = trained("english", "the black cat");
        let klingon = trained("klingon", "qapla batlh");
        save_profile_dir(dir.path(), &[english.clone(), klingon]).unwrap();
        let klingon_freq = frequency_path(dir.path(), "klingon");
        save_frequency_table(&klingon_freq, &FrequencyTable::from_tokens(["qapla"])).unwrap();
        fs::write(dir.path().join("notes.txt"), "kept").unwrap();

        save_profile_dir(dir.path(), &[english.clone()]).unwrap();

        let loaded = load_profile_dir(dir.path()).unwrap();
        assert_eq!(loaded, vec![english]);
        assert!(!klingon_freq.exists());
        assert!(!profile_path(dir.path(), "klingon").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn empty_or_broken_files_are_malformed() {
        let empty = read_profile("x", "".as_bytes()).unwrap_err();
        assert!(matches!(empty, LangIdError::MalformedProfile { .. }));
        let gap = read_profile("x", "e\n\nt\n".as_bytes()).unwrap_err();
        assert!(matches!(gap, LangIdError::MalformedProfile { .. }));
        let invalid = read_profile("x", &[b'e', b'\n', 0xff, b'\n'][..]).unwrap_err();
        assert!(invalid.is_configuration_error());
    }

    #[test]
    fn profile_dir_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let profiles = vec![
            trained("spanish", "el gato negro"),
            trained("english", "the black cat"),
        ];
        save_profile_dir(dir.path(), &profiles).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a profile").unwrap();

        let loaded = load_profile_dir(dir.path()).unwrap();
        let languages: Vec<&str> = loaded.iter().map(|p| p.language()).collect();
        assert_eq!(languages, vec!["english", "spanish"]);
        assert_eq!(loaded[0], profiles[1]);
        assert_eq!(loaded[1], profiles[0]);
    }

    #[test]
    fn empty_profile_dir_has_no_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_profile_dir(dir.path()).unwrap_err();
        assert!(matches!(err, LangIdError::NoProfiles));
    }

    #[test]
    fn frequency_dump_is_in_rank_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = frequency_path(dir.path(), "toy");
        let table = FrequencyTable::from_tokens(["aab"]);
        save_frequency_table(&path, &table).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().next(), Some("a\t2"));
        assert_eq!(text.lines().count(), table.len());
    }

    #[test]
    fn bundle_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.bin");
        let profiles = vec![trained("english", "the cat"), trained("german", "die katze")];

        save_bundle(&path, &profiles).unwrap();
        assert_eq!(load_bundle(&path).unwrap(), profiles);
        assert_eq!(load_profiles(&path).unwrap(), profiles);
    }

    #[test]
    fn garbage_bundle_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.bin");
        fs::write(&path, b"definitely not bincode").unwrap();
        assert!(load_bundle(&path).unwrap_err().is_configuration_error());
    }
}

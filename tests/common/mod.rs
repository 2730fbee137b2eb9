#![allow(dead_code)]

use cipherforge::scorer::LanguageModel;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

pub const CORPUS: &str = "\
The old lighthouse keeper climbed the narrow stairs every evening before the sun went down. \
He carried a lantern, a small notebook and a flask of strong tea, and he counted the steps \
out loud as his father had done before him. From the gallery at the top he could see the \
whole of the bay, the fishing boats returning with their nets, and the long grey line of the \
harbour wall where the children waited for their fathers. When the wind turned to the north \
he wrote the date in his notebook and drew a small arrow beside it. Nobody ever asked him why \
he kept these records, and he never thought to explain. In the winter the storms came one after \
another, and the keeper would sit by the great lamp through the night, listening to the waves \
breaking against the rocks below. Sometimes a ship would signal with its own light, and he \
would answer with three short flashes to show that the channel was clear. The village depended \
on him more than anyone would admit. When at last the harbour master sent a letter saying that \
the lamp was to be replaced by an automatic beacon, the keeper read it twice, folded it carefully \
and placed it inside the notebook with the arrows and the dates. On his final evening he climbed \
the stairs more slowly than usual, counting every step, and when he reached the top he stood for \
a long time watching the boats come home across the quiet water. ";

/// One sentence of the corpus, used as the secret message in search tests.
pub const PLAINTEXT: &str = "When the wind turned to the north he wrote the date in his \
notebook and drew a small arrow beside it";

pub fn corpus_model(n: usize) -> Arc<LanguageModel> {
    Arc::new(LanguageModel::train(CORPUS, n).unwrap())
}

/// Writes the corpus n-gram counts as a `GRAM COUNT` table.
pub fn corpus_ngram_file(n: usize) -> NamedTempFile {
    let letters = cipherforge::util::letters_upper(CORPUS);
    let mut counts: HashMap<&[u8], u64> = HashMap::new();
    for w in letters.as_bytes().windows(n) {
        *counts.entry(w).or_insert(0) += 1;
    }

    let mut file = NamedTempFile::new().unwrap();
    for (gram, count) in counts {
        writeln!(file, "{} {}", String::from_utf8_lossy(gram), count).unwrap();
    }
    file.flush().unwrap();
    file
}

//! Built-in sample records, substituted whenever the remote store cannot be
//! read. The app never surfaces a hard failure for reads; it degrades to this
//! set and keeps the screen usable.

use crate::model::{Record, RecordId};

struct Sample {
    id: &'static str,
    name: &'static str,
    body: &'static str,
    translation: &'static str,
}

// The first five entries carry full texts; the rest are list-only stubs that
// still open on the detail screen.
const SAMPLES: &[Sample] = &[
    Sample {
        id: "1",
        name: "Doa Memohon Kebaikan Dunia dan Akhirat",
        body: "رَبَّنَا آتِنَا فِي الدُّنْيَا حَسَنَةً وَفِي الْآخِرَةِ حَسَنَةً وَقِنَا عَذَابَ النَّارِ",
        translation: "Ya Tuhan kami, berilah kami kebaikan di dunia dan kebaikan di akhirat dan peliharalah kami dari siksa neraka.",
    },
    Sample {
        id: "2",
        name: "Doa Memohon Kesabaran",
        body: "رَبَّنَا أَفْرِغْ عَلَيْنَا صَبْرًا وَثَبِّتْ أَقْدَامَنَا وَانصُرْنَا عَلَى الْقَوْمِ الْكَافِرِينَ",
        translation: "Ya Tuhan kami, limpahkanlah kesabaran kepada kami dan kokohkanlah pendirian kami dan tolonglah kami terhadap orang-orang kafir.",
    },
    Sample {
        id: "3",
        name: "Doa Memohon Perlindungan",
        body: "رَبَّنَا لَا تَجْعَلْنَا فِتْنَةً لِّلْقَوْمِ الظَّالِمِينَ وَنَجِّنَا بِرَحْمَتِكَ مِنَ الْقَوْمِ الْكَافِرِينَ",
        translation: "Ya Tuhan kami, janganlah Engkau jadikan kami sasaran fitnah bagi kaum yang zalim, dan selamatkanlah kami dengan rahmat Engkau dari kaum yang kafir.",
    },
    Sample {
        id: "4",
        name: "Doa Memohon Ampunan",
        body: "رَبَّنَا اغْفِرْ لَنَا ذُنُوبَنَا وَإِسْرَافَنَا فِي أَمْرِنَا وَثَبِّتْ أَقْدَامَنَا وَانصُرْنَا عَلَى الْقَوْمِ الْكَافِرِينَ",
        translation: "Ya Tuhan kami, ampunilah dosa-dosa kami dan tindakan-tindakan kami yang berlebih-lebihan dalam urusan kami dan tetapkanlah pendirian kami, dan tolonglah kami terhadap kaum yang kafir.",
    },
    Sample {
        id: "5",
        name: "Doa Memohon Petunjuk",
        body: "رَبَّنَا لَا تُزِغْ قُلُوبَنَا بَعْدَ إِذْ هَدَيْتَنَا وَهَبْ لَنَا مِن لَّدُنكَ رَحْمَةً ۚ إِنَّكَ أَنتَ الْوَهَّابُ",
        translation: "Ya Tuhan kami, janganlah Engkau jadikan hati kami condong kepada kesesatan sesudah Engkau beri petunjuk kepada kami, dan karuniakanlah kepada kami rahmat dari sisi Engkau; karena sesungguhnya Engkau-lah Maha Pemberi (karunia).",
    },
    Sample {
        id: "6",
        name: "Doa Memohon Rezeki yang Halal",
        body: "",
        translation: "",
    },
    Sample {
        id: "7",
        name: "Doa Memohon Ilmu yang Bermanfaat",
        body: "",
        translation: "",
    },
    Sample {
        id: "8",
        name: "Doa Memohon Keselamatan",
        body: "",
        translation: "",
    },
    Sample {
        id: "9",
        name: "Doa Memohon Kekuatan Iman",
        body: "",
        translation: "",
    },
    Sample {
        id: "10",
        name: "Doa Memohon Ketenangan Hati",
        body: "",
        translation: "",
    },
];

pub fn sample_records() -> Vec<Record> {
    SAMPLES
        .iter()
        .map(|s| Record {
            id: RecordId::new(s.id),
            name: s.name.to_string(),
            body: s.body.to_string(),
            translation: s.translation.to_string(),
        })
        .collect()
}

pub fn sample_record_ids() -> Vec<RecordId> {
    SAMPLES.iter().map(|s| RecordId::new(s.id)).collect()
}

/// The sample record with the given id, or the first sample when the id has
/// no counterpart. Never empty-handed.
pub fn find_sample(id: &RecordId) -> Record {
    let records = sample_records();
    records
        .iter()
        .find(|r| &r.id == id)
        .cloned()
        .unwrap_or_else(|| records[0].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_samples_with_distinct_ids() {
        let records = sample_records();
        assert_eq!(records.len(), 10);

        let mut ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn ids_align_with_sample_records() {
        let records = sample_records();
        let ids = sample_record_ids();
        assert_eq!(
            ids,
            records.iter().map(|r| r.id.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn find_sample_falls_back_to_first() {
        let known = find_sample(&RecordId::new("5"));
        assert_eq!(known.name, "Doa Memohon Petunjuk");
        assert!(!known.body.is_empty());

        let unknown = find_sample(&RecordId::new("999"));
        assert_eq!(unknown.id, RecordId::new("1"));
    }
}

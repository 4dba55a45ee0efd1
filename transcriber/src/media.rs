use crate::TranscriptionError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Mp3,
    Wav,
    Flac,
    M4a,
    Aac,
    Ogg,
}

impl MediaType {
    pub const ALL: [MediaType; 6] = [MediaType::Mp3, MediaType::Wav, MediaType::Flac, MediaType::M4a, MediaType::Aac, MediaType::Ogg];

    /// Parse a `Content-Type` value. Parameters such as `; codecs=opus` are ignored.
    pub fn from_mime(mime: &str) -> Result<Self, TranscriptionError> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        let media = match essence.as_str() {
            "audio/mpeg" | "audio/mp3" | "audio/mpeg3" | "audio/x-mpeg-3" => MediaType::Mp3,
            "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => MediaType::Wav,
            "audio/flac" | "audio/x-flac" => MediaType::Flac,
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" => MediaType::M4a,
            "audio/aac" | "audio/x-aac" | "audio/aacp" => MediaType::Aac,
            "audio/ogg" | "application/ogg" | "audio/vorbis" | "audio/opus" => MediaType::Ogg,
            _ => return Err(TranscriptionError::UnsupportedMedia(mime.to_string())),
        };
        Ok(media)
    }

    pub fn from_extension(ext: &str) -> Result<Self, TranscriptionError> {
        Self::ALL
            .into_iter()
            .find(|m| m.extension().eq_ignore_ascii_case(ext.trim_start_matches('.')))
            .ok_or_else(|| TranscriptionError::UnsupportedMedia(ext.to_string()))
    }

    pub fn extension(self) -> &'static str {
        match self {
            MediaType::Mp3 => "mp3",
            MediaType::Wav => "wav",
            MediaType::Flac => "flac",
            MediaType::M4a => "m4a",
            MediaType::Aac => "aac",
            MediaType::Ogg => "ogg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            MediaType::Mp3 => "audio/mpeg",
            MediaType::Wav => "audio/wav",
            MediaType::Flac => "audio/flac",
            MediaType::M4a => "audio/mp4",
            MediaType::Aac => "audio/aac",
            MediaType::Ogg => "audio/ogg",
        }
    }
}

impl FromStr for MediaType {
    type Err = TranscriptionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('/') { Self::from_mime(s) } else { Self::from_extension(s) }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.extension()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_mime_types() {
        assert_eq!(MediaType::from_mime("audio/mpeg").unwrap(), MediaType::Mp3);
        assert_eq!(MediaType::from_mime("Audio/X-WAV").unwrap(), MediaType::Wav);
        assert_eq!(MediaType::from_mime("audio/ogg; codecs=opus").unwrap(), MediaType::Ogg);
        assert_eq!(MediaType::from_mime("audio/x-m4a").unwrap(), MediaType::M4a);
    }

    #[test]
    fn rejects_other_media() {
        assert!(matches!(MediaType::from_mime("video/mp4"), Err(TranscriptionError::UnsupportedMedia(_))));
        assert!(MediaType::from_extension("txt").is_err());
    }

    #[test]
    fn extensions_round_trip() {
        for m in MediaType::ALL {
            assert_eq!(MediaType::from_extension(m.extension()).unwrap(), m);
            assert_eq!(m.mime().parse::<MediaType>().unwrap(), m);
        }
        assert_eq!(".FLAC".parse::<MediaType>().unwrap(), MediaType::Flac);
    }
}

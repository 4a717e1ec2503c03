//! Attribute keyword vocabulary understood by mkifs and mkqnx6fs.

use std::collections::BTreeSet;

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum MkifsBooleanAttributeKeyword {
    Autolink,
    BigPages,
    Bigendian,
    Compress,
    Dupignore,
    Followlink,
    Include,
    Keeplinked,
    Optional,
    PageAlign,
    Raw,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Mkqnx6fsBooleanAttributeKeyword {
    Alimit,
    Bigendian,
    BootCls,
    BootQuiet,
    DfltBoot,
    Dupignore,
    Followlink,
    FsysLfncks,
    Include,
    NameEnc,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum MkifsValuedAttributeKeyword {
    Autoso,
    Cd,
    Chain,
    Cksum,
    Compress,
    Dperms,
    Drop,
    Filter,
    Gid,
    Image,
    Keepsection,
    Linker,
    Module,
    Mount,
    Mtime,
    Pagesizes,
    Perms,
    PhysAlign,
    Physical,
    Prefix,
    Ram,
    Search,
    #[strum(serialize = "sha256")]
    Sha256,
    #[strum(serialize = "sha512")]
    Sha512,
    Type,
    Uid,
    Virtual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Mkqnx6fsValuedAttributeKeyword {
    Cd,
    Dperms,
    Filter,
    Gid,
    Mtime,
    Perms,
    Prefix,
    Search,
    Type,
    Uid,
}

fn keywords_of<E>() -> impl Iterator<Item = &'static str>
where
    E: IntoEnumIterator + Into<&'static str>,
{
    E::iter().map(Into::into)
}

lazy_static! {
    /// Every boolean keyword either tool accepts
    pub static ref BOOLEAN_KEYWORDS: BTreeSet<&'static str> = keywords_of::<MkifsBooleanAttributeKeyword>()
        .chain(keywords_of::<Mkqnx6fsBooleanAttributeKeyword>())
        .collect();

    /// Every valued keyword either tool accepts
    pub static ref VALUED_KEYWORDS: BTreeSet<&'static str> = keywords_of::<MkifsValuedAttributeKeyword>()
        .chain(keywords_of::<Mkqnx6fsValuedAttributeKeyword>())
        .collect();
}

pub fn is_boolean_keyword(name: &str) -> bool {
    BOOLEAN_KEYWORDS.contains(name)
}

pub fn is_valued_keyword(name: &str) -> bool {
    VALUED_KEYWORDS.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("big_pages" ; "mkifs multi word")]
    #[test_case("fsys_lfncks" ; "mkqnx6fs only")]
    #[test_case("optional" ; "shared")]
    fn test_known_boolean_keywords(name: &str) {
        assert!(is_boolean_keyword(name));
    }

    #[test_case("sha256" ; "digest")]
    #[test_case("phys_align" ; "multi word")]
    #[test_case("uid" ; "shared")]
    fn test_known_valued_keywords(name: &str) {
        assert!(is_valued_keyword(name));
    }

    #[test]
    fn test_union_has_no_duplicates() {
        assert_eq!(BOOLEAN_KEYWORDS.len(), 18);
        assert_eq!(VALUED_KEYWORDS.len(), 27);
        assert!(!is_valued_keyword("optional"));
        assert!(!is_boolean_keyword("Optional"));
    }
}

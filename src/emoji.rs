//! Custom emoji catalogue for the home server.
//!
//! Discord renders `<a:name:id>` as an animated emoji and `<:name:id>` as a
//! static one. The name and id must match the uploaded asset exactly.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmojiEntry {
    pub name: &'static str,
    pub external_id: &'static str,
    pub animated: bool,
}

impl EmojiEntry {
    const fn animated(name: &'static str, external_id: &'static str) -> Self {
        Self {
            name,
            external_id,
            animated: true,
        }
    }

    const fn still(name: &'static str, external_id: &'static str) -> Self {
        Self {
            name,
            external_id,
            animated: false,
        }
    }

    pub fn render(&self) -> String {
        let prefix = if self.animated { "a" } else { "" };
        format!("<{}:{}:{}>", prefix, self.name, self.external_id)
    }
}

pub const CATALOGUE: &[EmojiEntry] = &[
    EmojiEntry::animated("cat_tongue_gif", "1468613506055147774"),
    EmojiEntry::animated("heartbreak_gif", "1468605021930393744"),
    // TODO: re-copy this id from the server emoji settings, it is two digits short.
    EmojiEntry::animated("gothknife_gif", "14686144816029798"),
    EmojiEntry::animated("cutemadhamster_gif", "1468613738159538217"),
    EmojiEntry::animated("skull_dancing_gif", "1468613535847288953"),
    EmojiEntry::animated("babes_gif", "1468613789523116289"),
    EmojiEntry::animated("monsterdrink_gif", "1468613783214886945"),
    EmojiEntry::animated("heartflame_gif", "1468613780652167221"),
    EmojiEntry::animated("emoaesthetics_gif", "1468613777351250178"),
    EmojiEntry::animated("draculaura_gif", "1468613771399532584"),
    EmojiEntry::animated("bettyboopdance_gif", "1468613765888086160"),
    EmojiEntry::still("x_pixelated", "1468605809297592524"),
    EmojiEntry::still("leave", "1468605545354104934"),
    EmojiEntry::still("xxx", "1468605378991358098"),
    EmojiEntry::still("America", "1468605175072555090"),
    EmojiEntry::still("thinking_butt", "1468604911804743793"),
    EmojiEntry::still("fih", "1468600471743631444"),
    EmojiEntry::still("fish", "1468600431906390171"),
    EmojiEntry::still("fire", "1468600364717703398"),
    EmojiEntry::still("thinking", "1468600282970849383"),
    EmojiEntry::still("nerd", "1468600267392942140"),
    EmojiEntry::still("gothhearteyes", "1468613760590680293"),
    EmojiEntry::still("hkgun", "1468613752671961118"),
    EmojiEntry::still("halloweenscream", "1468613750843244674"),
    EmojiEntry::still("handgun", "1468613748473200784"),
    EmojiEntry::still("teethheart", "1468613736322564166"),
    EmojiEntry::still("gothswitch", "1468613730932752569"),
    EmojiEntry::still("biteme", "1468613728097534156"),
    EmojiEntry::still("gothhart", "1468613726088204600"),
    EmojiEntry::still("skeletonpeacesign", "1468613684740755638"),
    EmojiEntry::still("cheekygoth", "1468613787488882699"),
    EmojiEntry::still("you_died", "1468613785425281146"),
    EmojiEntry::still("tiredofthisshit", "1468613773404278784"),
    EmojiEntry::still("darkanime", "1468613769683796184"),
    EmojiEntry::still("gothwoman", "1468613767746162782"),
    EmojiEntry::still("gothnailcare", "1468613764218749020"),
];

pub fn lookup(name: &str) -> Option<&'static EmojiEntry> {
    CATALOGUE.iter().find(|entry| entry.name == name)
}

/// Every catalogue entry in render-ready form.
pub fn rendered_tokens() -> Vec<String> {
    CATALOGUE.iter().map(EmojiEntry::render).collect()
}
